//! Prompt construction and answer cleanup.

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Wrap the research `data` in the answering instructions for `query`.
pub fn build_prompt(query: &str, data: &str) -> String {
    format!(
        "I performed a web search for `{query}`.\n\
         Formulate a response based upon my search results:\n\n\
         {data}\n\
         In addition, separately answer my question of `{query}` directly without \
         considering the information I provided previously. Finally, provide a summary \
         which considers both of your answers.\n"
    )
}

/// Split `text` into sentences at `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !TERMINATORS.contains(&c) || !chars.peek().is_some_and(|(_, n)| n.is_whitespace()) {
            continue;
        }
        sentences.push(&text[start..=i]);
        while chars.peek().is_some_and(|(_, n)| n.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map_or(text.len(), |(j, _)| *j);
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Drop a trailing sentence the model was cut off in the middle of.
///
/// Kept sentences are re-joined with single spaces. Text that would end up
/// empty is returned trimmed but otherwise unchanged.
pub fn remove_incomplete_sentence(text: &str) -> String {
    let text = text.trim();
    let mut sentences = split_sentences(text);
    if sentences
        .last()
        .is_some_and(|last| !last.ends_with(TERMINATORS))
    {
        sentences.pop();
    }
    if sentences.is_empty() {
        return text.to_string();
    }
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_wraps_data() {
        let prompt = build_prompt("rust", "Wikipedia:\n```\nRust.\n```\n\n");
        assert!(prompt.starts_with("I performed a web search for `rust`.\n"));
        assert!(prompt.contains("search results:\n\nWikipedia:\n```\nRust.\n```\n\n\nIn addition"));
        assert!(prompt.contains("my question of `rust` directly"));
        assert!(prompt.ends_with("considers both of your answers.\n"));
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two!  Three? four"),
            vec!["One.", "Two!", "Three?", "four"]
        );
        assert_eq!(split_sentences("v1.2 is out."), vec!["v1.2 is out."]);
    }

    #[test]
    fn test_drops_trailing_fragment() {
        assert_eq!(
            remove_incomplete_sentence("Rust is fast.\nIt is also safe! And the"),
            "Rust is fast. It is also safe!"
        );
    }

    #[test]
    fn test_keeps_complete_text() {
        assert_eq!(
            remove_incomplete_sentence("Done. Really done?"),
            "Done. Really done?"
        );
    }

    #[test]
    fn test_keeps_text_without_any_full_sentence() {
        assert_eq!(remove_incomplete_sentence("no stop here"), "no stop here");
        assert_eq!(remove_incomplete_sentence(""), "");
        assert_eq!(
            remove_incomplete_sentence("\n  no stop here \n"),
            "no stop here"
        );
    }
}
