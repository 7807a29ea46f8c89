//! In-memory chat page.
//!
//! [`MemoryDom`] keeps the same observable state as the browser page: input
//! value and height, focus, indicator, appended messages and their controls.
//! Received bodies are parsed with `scraper` to answer text queries the way
//! `textContent` would.

use std::cell::{Cell, RefCell};

use scraper::{Html, Selector};

use crate::contract::{ANSWER_ID, SOURCES_CLASS};

use super::dom::{ChatDom, Clipboard, Display, Indicator, MessageControl, UiError};
use super::message::Message;

/// Pixel height of one textarea line.
const LINE_HEIGHT: f64 = 20.0;
/// Vertical padding of the textarea.
const INPUT_PADDING: f64 = 4.0;

/// A message as it sits in the pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMessage {
    /// The appended message.
    pub message: Message,
    /// Controls appended after it, in order.
    pub controls: Vec<MessageControl>,
    /// Inline display of its sources list.
    pub sources_display: Display,
}

#[derive(Debug)]
struct DomState {
    input: String,
    input_height: Option<f64>,
    focused: bool,
    viewport_width: f64,
    indicator: Indicator,
    messages: Vec<MemoryMessage>,
    scrolled_to: usize,
}

/// [`ChatDom`] without a browser.
#[derive(Debug)]
pub struct MemoryDom {
    state: RefCell<DomState>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new(1280.0)
    }
}

impl MemoryDom {
    /// Empty page with the given viewport width in pixels.
    pub fn new(viewport_width: f64) -> Self {
        Self {
            state: RefCell::new(DomState {
                input: String::new(),
                input_height: None,
                focused: false,
                viewport_width,
                indicator: Indicator::Idle,
                messages: Vec::new(),
                scrolled_to: 0,
            }),
        }
    }

    /// Replace the textarea contents, as if typed.
    pub fn type_text(&self, text: &str) {
        self.state.borrow_mut().input = text.to_string();
    }

    /// Pinned textarea height, `None` while `auto`.
    pub fn input_height(&self) -> Option<f64> {
        self.state.borrow().input_height
    }

    /// Whether the textarea has focus.
    pub fn is_focused(&self) -> bool {
        self.state.borrow().focused
    }

    /// Current indicator state.
    pub fn indicator(&self) -> Indicator {
        self.state.borrow().indicator
    }

    /// Snapshot of the chat pane.
    pub fn messages(&self) -> Vec<MemoryMessage> {
        self.state.borrow().messages.clone()
    }

    /// Whether the pane was scrolled after the last append.
    pub fn is_scrolled_to_bottom(&self) -> bool {
        let state = self.state.borrow();
        state.scrolled_to == state.messages.len()
    }

    fn with_message<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut MemoryMessage) -> Result<T, UiError>,
    ) -> Result<T, UiError> {
        let mut state = self.state.borrow_mut();
        let message = state
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.message.id == id)
            .ok_or_else(|| UiError::MissingMessage {
                id: id.to_string(),
                part: "message",
            })?;
        f(message)
    }

    fn parse_body(&self, id: &str) -> Result<Html, UiError> {
        self.with_message(id, |m| Ok(Html::parse_fragment(&m.message.body)))
    }

    /// Fails unless the message body carries a sources list.
    fn require_sources(&self, id: &str) -> Result<(), UiError> {
        let body = self.parse_body(id)?;
        let selector = selector(&format!(".{SOURCES_CLASS}"))?;
        if body.select(&selector).next().is_some() {
            Ok(())
        } else {
            Err(UiError::MissingMessage {
                id: id.to_string(),
                part: "sources",
            })
        }
    }
}

fn selector(css: &str) -> Result<Selector, UiError> {
    Selector::parse(css).map_err(|e| UiError::MissingElement(format!("{css}: {e}")))
}

impl ChatDom for MemoryDom {
    fn focus_input(&self) -> Result<(), UiError> {
        self.state.borrow_mut().focused = true;
        Ok(())
    }

    fn input_value(&self) -> Result<String, UiError> {
        Ok(self.state.borrow().input.clone())
    }

    fn clear_input(&self) -> Result<(), UiError> {
        self.state.borrow_mut().input.clear();
        Ok(())
    }

    fn reset_input_height(&self) -> Result<(), UiError> {
        self.state.borrow_mut().input_height = None;
        Ok(())
    }

    fn input_scroll_height(&self) -> Result<f64, UiError> {
        let state = self.state.borrow();
        let lines = state.input.lines().count().max(1);
        #[allow(clippy::cast_precision_loss)]
        let content = lines as f64 * LINE_HEIGHT;
        // An explicit height larger than the content would be reported instead.
        Ok(state
            .input_height
            .map_or(content + INPUT_PADDING, |h| h.max(content + INPUT_PADDING)))
    }

    fn set_input_height(&self, px: f64) -> Result<(), UiError> {
        self.state.borrow_mut().input_height = Some(px);
        Ok(())
    }

    fn viewport_width(&self) -> Result<f64, UiError> {
        Ok(self.state.borrow().viewport_width)
    }

    fn append_message(&self, message: &Message) -> Result<(), UiError> {
        self.state.borrow_mut().messages.push(MemoryMessage {
            message: message.clone(),
            controls: Vec::new(),
            sources_display: Display::Unset,
        });
        Ok(())
    }

    fn append_control(&self, message_id: &str, control: MessageControl) -> Result<(), UiError> {
        self.with_message(message_id, |m| {
            m.controls.push(control);
            Ok(())
        })
    }

    fn scroll_to_bottom(&self) -> Result<(), UiError> {
        let mut state = self.state.borrow_mut();
        state.scrolled_to = state.messages.len();
        Ok(())
    }

    fn set_indicator(&self, indicator: Indicator) -> Result<(), UiError> {
        self.state.borrow_mut().indicator = indicator;
        Ok(())
    }

    fn sources_display(&self, message_id: &str) -> Result<Display, UiError> {
        self.require_sources(message_id)?;
        self.with_message(message_id, |m| Ok(m.sources_display))
    }

    fn set_sources_display(&self, message_id: &str, display: Display) -> Result<(), UiError> {
        self.require_sources(message_id)?;
        self.with_message(message_id, |m| {
            m.sources_display = display;
            Ok(())
        })
    }

    fn answer_text(&self, message_id: &str) -> Result<String, UiError> {
        let body = self.parse_body(message_id)?;
        let answer = selector(&format!("#{ANSWER_ID}"))?;
        body.select(&answer)
            .next()
            .map(|node| node.text().collect::<String>())
            .ok_or_else(|| UiError::MissingMessage {
                id: message_id.to_string(),
                part: "answer",
            })
    }

    fn sources_text(&self, message_id: &str) -> Result<String, UiError> {
        let body = self.parse_body(message_id)?;
        let sources = selector(&format!(".{SOURCES_CLASS}"))?;
        let item = selector("li")?;
        let list = body
            .select(&sources)
            .next()
            .ok_or_else(|| UiError::MissingMessage {
                id: message_id.to_string(),
                part: "sources",
            })?;
        let lines: Vec<String> = list
            .select(&item)
            .map(|li| li.text().collect::<String>().trim().to_string())
            .collect();
        Ok(lines.join("\n"))
    }
}

/// [`Clipboard`] that keeps the last copied text.
///
/// Each copy goes through a scratch node that must be gone once the copy
/// returns, successful or not.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
    scratch: Cell<usize>,
    fail_next: Cell<bool>,
}

/// Scratch node held for the duration of one copy.
struct ScratchNode<'a>(&'a Cell<usize>);

impl<'a> ScratchNode<'a> {
    fn insert(count: &'a Cell<usize>) -> Self {
        count.set(count.get() + 1);
        Self(count)
    }
}

impl Drop for ScratchNode<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl MemoryClipboard {
    /// Last copied text.
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Scratch nodes still attached.
    pub fn scratch_nodes(&self) -> usize {
        self.scratch.get()
    }

    /// Make the next copy fail, as a browser refusing `execCommand` would.
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), UiError> {
        let _node = ScratchNode::insert(&self.scratch);
        if self.fail_next.replace(false) {
            return Err(UiError::Clipboard("copy command rejected".to_string()));
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}
