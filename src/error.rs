//! Error types for the search and LLM pipeline.

use thiserror::Error;

/// Crate error type.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The LLM backend could not be reached at all.
    #[error("Error: {source}.\n\nIs the {backend} server running?")]
    BackendUnreachable {
        /// Backend display name.
        backend: &'static str,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The LLM backend answered with a non-success status.
    #[error("Error: {0}")]
    BackendStatus(u16),

    /// A remote service answered with something we could not interpret.
    #[error("Unexpected response from {service}: {detail}")]
    UnexpectedResponse {
        /// Service name.
        service: &'static str,
        /// What was wrong.
        detail: String,
    },

    /// Answer fragment could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
