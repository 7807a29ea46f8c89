//! Prompt blocks and answer rendering.
//!
//! Research results are handed to the model as fenced blocks, one per source
//! kind. Answers go back to the page as an HTML fragment whose node ids match
//! [`crate::contract`].

use std::fmt::Write as _;

use askama::Template;

use crate::error::Result;

use super::{NewsHit, TextHit, WikiSummary};

/// Answer node followed by the collapsible sources list.
#[derive(Template)]
#[template(
    source = "<div id='answer-response'>{{ answer }}</div>\n<ul id='sources' class='sources'>\n{% for link in sources %} <li class='source-item'><a href='{{ link }}' target='_blank' class='source-link'>{{ link }}</a></li>\n{% endfor %} </ul>",
    ext = "html"
)]
struct AnswerFragment<'a> {
    answer: &'a str,
    sources: &'a [String],
}

/// `Wikipedia:` block.
pub fn wikipedia_block(summary: &WikiSummary) -> String {
    format!("Wikipedia:\n```\n{}\n```\n", summary.summary)
}

/// `Web search results:` block.
pub fn search_block(hits: &[TextHit]) -> String {
    let mut block = String::from("Web search results:\n```\n");
    for hit in hits {
        let _ = write!(
            block,
            "Page title: {}\nURL: {}\nPage meta: {}\n\n",
            hit.title, hit.href, hit.body
        );
    }
    block.push_str("```\n");
    block
}

/// `News search results:` block.
pub fn news_block(hits: &[NewsHit]) -> String {
    let mut block = String::from("News search results:\n```\n");
    for hit in hits {
        let _ = write!(
            block,
            "Page title: {}\nURL: {}\nPage meta: {}\nNews source: {}\n\n",
            hit.title, hit.url, hit.body, hit.source
        );
    }
    block.push_str("```\n");
    block
}

/// HTML fragment returned in `SearchResponse::result`. Text is escaped.
pub fn render_answer_html(answer: &str, sources: &[String]) -> Result<String> {
    Ok(AnswerFragment { answer, sources }.render()?)
}

/// Terminal rendering of the sources: one link per line.
pub fn render_sources_plain(sources: &[String]) -> String {
    sources.iter().fold(String::new(), |mut out, link| {
        let _ = writeln!(out, "{link}");
        out
    })
}
