//! Capability interface over the chat page.
//!
//! [`ChatDom`] is the set of element handles the controller needs, resolved
//! once by the implementation. Keeping the controller behind this trait lets
//! it run against a live `web-sys` document or the in-memory
//! [`MemoryDom`](super::memory::MemoryDom) in tests.

use thiserror::Error;

use super::message::Message;

/// Errors raised by UI handlers.
///
/// A handler that fails aborts on its own; other handlers and the page keep
/// working.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// A page element the controller binds to is absent.
    #[error("missing element: {0}")]
    MissingElement(String),

    /// No message with this id exists, or it lacks the expected child.
    #[error("missing message content: {id} ({part})")]
    MissingMessage {
        /// Message id.
        id: String,
        /// The child that could not be found.
        part: &'static str,
    },

    /// Writing to the clipboard failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// The search request did not complete.
    #[error("search request failed: {0}")]
    Request(String),

    /// The search response body was not the expected JSON.
    #[error("search response could not be decoded: {0}")]
    Decode(String),
}

/// Visibility of the "request in flight" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    /// Send icon shown, loader hidden.
    #[default]
    Idle,
    /// Loader and pupil shown, send icon hidden.
    Loading,
}

/// Inline `display` style of a sources list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// No inline style; the stylesheet keeps the list collapsed.
    #[default]
    Unset,
    /// `display: block`.
    Block,
    /// `display: none`.
    None,
}

impl Display {
    /// Parse an inline `display` value.
    pub fn from_style(value: &str) -> Self {
        match value.trim() {
            "" => Self::Unset,
            "none" => Self::None,
            _ => Self::Block,
        }
    }

    /// The inline style value to write back.
    pub fn as_style(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Block => "block",
            Self::None => "none",
        }
    }

    /// Whether the list is shown.
    pub fn is_visible(self) -> bool {
        self == Self::Block
    }

    /// The state after one click on the toggle.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Unset | Self::None => Self::Block,
            Self::Block => Self::None,
        }
    }
}

/// Action buttons appended under a received answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageControl {
    /// Expand or collapse the cited sources.
    SourcesToggle,
    /// Copy the answer followed by the sources.
    CopyWithSources,
    /// Copy the answer only.
    CopyAnswer,
}

impl MessageControl {
    /// Controls in the order they are appended.
    pub const ALL: [Self; 3] = [Self::SourcesToggle, Self::CopyWithSources, Self::CopyAnswer];

    /// CSS class of the button.
    pub fn class(self) -> &'static str {
        match self {
            Self::SourcesToggle => "sources-button",
            Self::CopyWithSources => "copy-all-button",
            Self::CopyAnswer => "copy-button",
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SourcesToggle => "cited sources",
            Self::CopyWithSources => "copy with sources",
            Self::CopyAnswer => "copy",
        }
    }

    /// Value of the button's `data-action` attribute.
    pub fn action(self) -> &'static str {
        match self {
            Self::SourcesToggle => "toggle-sources",
            Self::CopyWithSources => "copy-with-sources",
            Self::CopyAnswer => "copy-answer",
        }
    }

    /// Inverse of [`MessageControl::action`].
    pub fn from_action(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.action() == action)
    }
}

/// Element handles and queries the chat controller operates on.
pub trait ChatDom {
    /// Move keyboard focus to the question textarea.
    fn focus_input(&self) -> Result<(), UiError>;

    /// Current textarea value, untrimmed.
    fn input_value(&self) -> Result<String, UiError>;

    /// Empty the textarea.
    fn clear_input(&self) -> Result<(), UiError>;

    /// Set the textarea height back to `auto`.
    fn reset_input_height(&self) -> Result<(), UiError>;

    /// Content height of the textarea in pixels, measured after a reset.
    fn input_scroll_height(&self) -> Result<f64, UiError>;

    /// Pin the textarea height in pixels.
    fn set_input_height(&self, px: f64) -> Result<(), UiError>;

    /// Viewport width in pixels.
    fn viewport_width(&self) -> Result<f64, UiError>;

    /// Append a message node to the chat pane.
    fn append_message(&self, message: &Message) -> Result<(), UiError>;

    /// Append an action button to an existing message.
    fn append_control(&self, message_id: &str, control: MessageControl) -> Result<(), UiError>;

    /// Scroll the chat pane to its end.
    fn scroll_to_bottom(&self) -> Result<(), UiError>;

    /// Show or hide the loading indicator.
    fn set_indicator(&self, indicator: Indicator) -> Result<(), UiError>;

    /// Inline display of a message's sources list.
    fn sources_display(&self, message_id: &str) -> Result<Display, UiError>;

    /// Overwrite the inline display of a message's sources list.
    fn set_sources_display(&self, message_id: &str, display: Display) -> Result<(), UiError>;

    /// Rendered text of a message's answer node.
    fn answer_text(&self, message_id: &str) -> Result<String, UiError>;

    /// Rendered text of a message's sources list, one item per line.
    fn sources_text(&self, message_id: &str) -> Result<String, UiError>;
}

/// Write access to the system clipboard.
pub trait Clipboard {
    /// Replace the clipboard contents. Succeeds silently.
    fn write_text(&self, text: &str) -> Result<(), UiError>;
}
