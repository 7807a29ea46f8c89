//! Contract between the chat page and the search endpoint.
//!
//! The page posts a [`SearchForm`] to [`SEARCH_PATH`] and renders the
//! [`SearchResponse::result`] fragment verbatim. The copy and toggle controls
//! locate their targets inside that fragment by [`ANSWER_ID`] and
//! [`SOURCES_CLASS`], so the server renderer and the client must agree on them.

use serde::{Deserialize, Serialize};

/// Path of the search endpoint.
pub const SEARCH_PATH: &str = "/search";

/// Form field carrying the user's question.
pub const INPUT_FIELD: &str = "input_text";

/// Id of the answer node inside a rendered result.
pub const ANSWER_ID: &str = "answer-response";

/// Class of the cited-sources list inside a rendered result.
pub const SOURCES_CLASS: &str = "sources";

/// Page element ids and classes the chat controller binds to.
pub mod page {
    /// Question textarea (id).
    pub const INPUT: &str = "input_text";
    /// Scrollable message pane (id).
    pub const CHAT_PANE: &str = "chat-messages";
    /// Question form (id).
    pub const FORM: &str = "user-input";
    /// "Thinking" indicator (class).
    pub const LOADER: &str = "loader";
    /// Eye of the "thinking" indicator (class).
    pub const PUPIL: &str = "pupil";
    /// Idle send icon (class).
    pub const SEND_ICON: &str = "send-icon";
    /// Send button (class).
    pub const SEND_BUTTON: &str = "send-button";
}

/// Form body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForm {
    /// The question, as typed.
    pub input_text: String,
}

impl SearchForm {
    /// Build a form for the given question.
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
        }
    }
}

/// JSON body returned by `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// HTML fragment: the answer node followed by the sources list.
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_shape() {
        let resp = SearchResponse {
            result: "<p>hi</p>".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({ "result": "<p>hi</p>" }));
    }

    #[test]
    fn test_form_field_name_matches_page() {
        let json = serde_json::to_value(SearchForm::new("why")).unwrap();
        assert!(json.get(INPUT_FIELD).is_some());
        assert_eq!(INPUT_FIELD, page::INPUT);
    }
}
