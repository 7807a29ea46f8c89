//! Chat UI controller.
//!
//! Wires user actions on the chat page to the search endpoint and renders the
//! answers. All state lives in the document itself except the in-flight count.
//!
//! # Example
//!
//! ```rust,ignore
//! let controller = ChatController::new(dom, clipboard, search);
//! controller.on_load()?;
//! if controller.on_keydown("Enter", false) == KeyAction::Send {
//!     controller.send().await?;
//! }
//! ```

use std::cell::Cell;

use tracing::{debug, error};

use crate::contract::{SearchForm, SearchResponse};

use super::client::SearchClient;
use super::dom::{ChatDom, Clipboard, Display, Indicator, MessageControl, UiError};
use super::message::{Message, generate_message_id};

/// Fraction of the viewport width the textarea may grow to.
pub const DEFAULT_MAX_INPUT_FRACTION: f64 = 0.15;

/// Behavior switches for [`ChatController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    /// Ignore sends while a search request is pending.
    pub single_flight: bool,
    /// Put the send icon back when a search request fails.
    ///
    /// Off by default: a failed request leaves the loader on screen.
    pub reset_indicator_on_failure: bool,
    /// Maximum textarea height as a fraction of the viewport width.
    pub max_input_fraction: f64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            single_flight: true,
            reset_indicator_on_failure: false,
            max_input_fraction: DEFAULT_MAX_INPUT_FRACTION,
        }
    }
}

/// What a key press in the textarea should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Suppress the newline and send.
    Send,
    /// Let the textarea handle the key.
    Default,
}

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty or whitespace.
    Ignored,
    /// Another request is still pending.
    Busy,
    /// The form was submitted.
    Submitted(SubmitOutcome),
}

/// Result of a submitted search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer was appended under this id.
    Delivered {
        /// Id of the received message.
        message_id: String,
    },
    /// The request failed; the error was logged.
    Failed(UiError),
}

/// Height the textarea should take: its content height, capped at a fraction
/// of the viewport width.
pub fn clamp_input_height(scroll_height: f64, viewport_width: f64, fraction: f64) -> f64 {
    scroll_height.min(viewport_width * fraction)
}

/// Counts a pending request until it settles.
struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn acquire(count: &'a Cell<usize>) -> Self {
        count.set(count.get() + 1);
        Self(count)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Drives the chat page through a [`ChatDom`].
#[derive(Debug)]
pub struct ChatController<D, C, S> {
    dom: D,
    clipboard: C,
    search: S,
    options: ControllerOptions,
    in_flight: Cell<usize>,
}

impl<D, C, S> ChatController<D, C, S>
where
    D: ChatDom,
    C: Clipboard,
    S: SearchClient,
{
    /// Create a controller with default options.
    pub fn new(dom: D, clipboard: C, search: S) -> Self {
        Self {
            dom,
            clipboard,
            search,
            options: ControllerOptions::default(),
            in_flight: Cell::new(0),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    /// The document this controller drives.
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// The clipboard copies go to.
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Whether any search request is pending.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get() > 0
    }

    /// Page is ready: focus the textarea.
    pub fn on_load(&self) -> Result<(), UiError> {
        self.dom.focus_input()
    }

    /// Grow or shrink the textarea to its content.
    ///
    /// Resets to `auto` before measuring so repeated calls do not drift.
    pub fn auto_expand(&self) -> Result<f64, UiError> {
        self.dom.reset_input_height()?;
        let height = clamp_input_height(
            self.dom.input_scroll_height()?,
            self.dom.viewport_width()?,
            self.options.max_input_fraction,
        );
        self.dom.set_input_height(height)?;
        Ok(height)
    }

    /// Enter sends; Shift+Enter inserts a newline.
    pub fn on_keydown(&self, key: &str, shift: bool) -> KeyAction {
        if key == "Enter" && !shift {
            KeyAction::Send
        } else {
            KeyAction::Default
        }
    }

    /// Send-button flow: echo the question, show the loader and submit.
    pub async fn send(&self) -> Result<SendOutcome, UiError> {
        let value = self.dom.input_value()?;
        let text = value.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.options.single_flight && self.is_in_flight() {
            debug!("send ignored, a search request is still pending");
            return Ok(SendOutcome::Busy);
        }

        self.dom.append_message(&Message::sent(text))?;
        self.dom.scroll_to_bottom()?;
        self.dom.set_indicator(Indicator::Loading)?;

        let form = SearchForm::new(text);
        self.dom.reset_input_height()?;
        self.dom.clear_input()?;

        self.submit(form).await.map(SendOutcome::Submitted)
    }

    /// Submit flow: post the form and append the answer.
    ///
    /// A failed request is logged and reported in the outcome; DOM errors
    /// while rendering are returned as `Err`.
    pub async fn submit(&self, form: SearchForm) -> Result<SubmitOutcome, UiError> {
        let _flight = InFlight::acquire(&self.in_flight);
        let message_id = generate_message_id();

        match self.search.search(&form).await {
            Ok(response) => {
                self.render_answer(&message_id, &response)?;
                Ok(SubmitOutcome::Delivered { message_id })
            }
            Err(err) => {
                error!(error = %err, "search request failed");
                if self.options.reset_indicator_on_failure {
                    self.dom.set_indicator(Indicator::Idle)?;
                }
                Ok(SubmitOutcome::Failed(err))
            }
        }
    }

    fn render_answer(&self, message_id: &str, response: &SearchResponse) -> Result<(), UiError> {
        self.dom.append_message(&Message::received(message_id, &response.result))?;
        for control in MessageControl::ALL {
            self.dom.append_control(message_id, control)?;
        }
        self.dom.scroll_to_bottom()?;
        self.dom.set_indicator(Indicator::Idle)
    }

    /// Show or hide the cited sources of a message.
    pub fn toggle_sources(&self, message_id: &str) -> Result<Display, UiError> {
        let next = self.dom.sources_display(message_id)?.toggled();
        self.dom.set_sources_display(message_id, next)?;
        Ok(next)
    }

    /// Copy the answer text of a message.
    pub fn copy_answer(&self, message_id: &str) -> Result<String, UiError> {
        let text = self.dom.answer_text(message_id)?;
        self.clipboard.write_text(&text)?;
        Ok(text)
    }

    /// Copy the answer text followed by its sources.
    pub fn copy_with_sources(&self, message_id: &str) -> Result<String, UiError> {
        let answer = self.dom.answer_text(message_id)?;
        let sources = self.dom.sources_text(message_id)?;
        let text = format!("{answer}\n{sources}");
        self.clipboard.write_text(&text)?;
        Ok(text)
    }

    /// Run the handler behind a message control.
    pub fn activate(&self, control: MessageControl, message_id: &str) -> Result<(), UiError> {
        match control {
            MessageControl::SourcesToggle => self.toggle_sources(message_id).map(|_| ()),
            MessageControl::CopyWithSources => self.copy_with_sources(message_id).map(|_| ()),
            MessageControl::CopyAnswer => self.copy_answer(message_id).map(|_| ()),
        }
    }
}
