//! LAISer: local AI search.
//!
//! A question is researched on the web (Wikipedia, DuckDuckGo web and news
//! results), handed to a local llama.cpp or Ollama model together with the
//! findings, and answered with the cited sources attached.
//!
//! # Architecture
//!
//! - **Server**: Axum serving the chat page and `POST /search`
//! - **Orchestration**: research, prompt, completion, cleanup
//! - **UI**: the chat page controller, compiled to wasm for the browser and
//!   tested natively against an in-memory document
//!
//! # Modules
//!
//! - [`contract`]: ids, classes and bodies shared by page and server
//! - [`ui`]: chat controller and its document abstraction
//! - [`search`]: web research
//! - [`llm`]: backend drivers and the orchestrator
//! - [`config`]: layered configuration and CLI
//! - [`server`]: HTTP routes

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod contract;
pub mod error;
pub mod ui;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod llm;
#[cfg(not(target_arch = "wasm32"))]
pub mod search;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(not(target_arch = "wasm32"))]
pub use state::AppState;

#[cfg(not(target_arch = "wasm32"))]
mod state {
    use std::sync::Arc;

    use tokio::sync::Mutex;

    use crate::config::AppConfig;
    use crate::llm::Orchestrator;

    /// Application state shared across all handlers.
    #[derive(Clone, Debug)]
    pub struct AppState {
        /// Answers questions.
        pub orchestrator: Arc<Orchestrator>,
        /// Held while a question is being answered.
        pub busy: Arc<Mutex<()>>,
        /// Global configuration.
        pub config: Arc<AppConfig>,
    }

    impl AppState {
        pub fn new(orchestrator: Orchestrator, config: AppConfig) -> Self {
            Self {
                orchestrator: Arc::new(orchestrator),
                busy: Arc::new(Mutex::new(())),
                config: Arc::new(config),
            }
        }
    }
}
