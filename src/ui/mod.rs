//! Chat page controller.
//!
//! The controller is written against the [`ChatDom`] capability interface so
//! it runs unchanged in the browser (feature `wasm`) and in tests.
//!
//! # Structure
//!
//! - [`controller`]: send, submit, toggle and copy flows
//! - [`dom`]: capability interfaces and UI error type
//! - [`message`]: rendered chat entries and their ids
//! - [`client`]: `POST /search` client
//! - [`memory`]: in-memory page
//! - `web`: `web-sys` page and listener wiring (feature `wasm`)

pub mod client;
pub mod controller;
pub mod dom;
pub mod memory;
pub mod message;
#[cfg(feature = "wasm")]
pub mod web;

pub use client::{HttpSearchClient, SearchClient};
pub use controller::{ChatController, ControllerOptions, KeyAction, SendOutcome, SubmitOutcome};
pub use dom::{ChatDom, Clipboard, Display, Indicator, MessageControl, UiError};
pub use memory::{MemoryClipboard, MemoryDom};
pub use message::{Direction, Message, generate_message_id};
