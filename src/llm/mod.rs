//! LLM backends.
//!
//! The [`LlmDriver`] trait is the single-shot completion interface both local
//! model servers implement. The [`Orchestrator`] builds the prompt from web
//! research and turns the completion into an [`Answer`].
//!
//! # Drivers
//!
//! - [`LlamaCppDriver`]: llama.cpp server (`/health`, `/completion`)
//! - [`OllamaDriver`]: Ollama (`/`, `/api/generate`)

pub mod llama_cpp;
pub mod ollama;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use llama_cpp::LlamaCppDriver;
pub use ollama::OllamaDriver;
pub use orchestrator::{Answer, Orchestrator, Research, ResearchSettings};
pub use provider::Provider;

use std::sync::Arc;

use crate::error::Result;

/// LLM connection and model settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Backend to talk to.
    pub provider: Provider,
    /// llama.cpp server base URL (e.g. `http://127.0.0.1:8080`).
    pub llama_cpp_url: String,
    /// Tokens llama.cpp may generate per answer.
    pub n_predict: u32,
    /// Ollama base URL, probed for liveness.
    pub ollama_base_url: String,
    /// Ollama generate endpoint.
    pub ollama_generate_url: String,
    /// Ollama model name.
    pub ollama_model: String,
}

/// Single-shot completion backend.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Which backend this is.
    fn provider(&self) -> Provider;

    /// Whether the server is up and ready to answer.
    async fn is_online(&self) -> bool;

    /// Complete `prompt`, returning the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable, answers with a
    /// non-success status, or the body lacks the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Driver for the configured backend.
pub fn build_driver(settings: &LlmSettings) -> Result<Arc<dyn LlmDriver>> {
    Ok(match settings.provider {
        Provider::LlamaCpp => Arc::new(LlamaCppDriver::new(
            settings.llama_cpp_url.clone(),
            settings.n_predict,
        )?),
        Provider::Ollama => Arc::new(OllamaDriver::new(
            settings.ollama_base_url.clone(),
            settings.ollama_generate_url.clone(),
            settings.ollama_model.clone(),
        )?),
    })
}
