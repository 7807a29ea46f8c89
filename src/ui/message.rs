//! Rendered chat entries.

use rand::Rng;

/// Length of generated message ids.
pub const MESSAGE_ID_LEN: usize = 11;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Which side of the conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Typed by the user.
    Sent,
    /// Returned by the search endpoint.
    Received,
}

impl Direction {
    /// CSS class added next to `message`.
    pub fn class(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
        }
    }
}

/// A chat entry. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Element id.
    pub id: String,
    /// Side of the conversation.
    pub direction: Direction,
    /// Plain text for sent messages, server-rendered HTML for received ones.
    pub body: String,
}

impl Message {
    /// A message typed by the user; `text` is rendered as text.
    pub fn sent(text: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            direction: Direction::Sent,
            body: text.into(),
        }
    }

    /// An answer wrapping the server's `result` fragment.
    pub fn received(id: impl Into<String>, result: &str) -> Self {
        Self {
            id: id.into(),
            direction: Direction::Received,
            body: format!("<p>{result}</p>"),
        }
    }
}

/// Pseudo-random base-36 id for a message element.
///
/// Not unique and not secret; collisions only produce a duplicate attribute.
pub fn generate_message_id() -> String {
    let mut rng = rand::thread_rng();
    (0..MESSAGE_ID_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_fixed_length_base36() {
        for _ in 0..100 {
            let id = generate_message_id();
            assert_eq!(id.len(), MESSAGE_ID_LEN);
            assert!(id.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_received_wraps_result() {
        let msg = Message::received("abc", "<b>x</b>");
        assert_eq!(msg.body, "<p><b>x</b></p>");
        assert_eq!(msg.direction.class(), "received");
    }
}
