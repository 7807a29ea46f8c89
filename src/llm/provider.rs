//! Backend selection and URL layout.
//!
//! This module handles the differences between the two supported local
//! model servers.

use std::fmt;

use serde::Deserialize;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Provider {
    /// llama.cpp HTTP server (`/health`, `/completion`).
    #[serde(rename = "llama.cpp", alias = "llamacpp", alias = "llama_cpp")]
    LlamaCpp,
    /// Ollama (`/`, `/api/generate`).
    #[default]
    #[serde(rename = "ollama")]
    Ollama,
}

impl Provider {
    /// Display name, as used in user-facing messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LlamaCpp => "llama.cpp",
            Self::Ollama => "ollama",
        }
    }

    /// URL of the liveness probe under `base_url`.
    #[must_use]
    pub fn health_url(self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::LlamaCpp => format!("{base}/health"),
            Self::Ollama => format!("{base}/"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_names() {
        let p: Provider = serde_json::from_str("\"llama.cpp\"").unwrap();
        assert_eq!(p, Provider::LlamaCpp);
        let p: Provider = serde_json::from_str("\"llama_cpp\"").unwrap();
        assert_eq!(p, Provider::LlamaCpp);
        let p: Provider = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(p, Provider::Ollama);
        assert!(serde_json::from_str::<Provider>("\"openai\"").is_err());
    }

    #[test]
    fn test_health_urls() {
        assert_eq!(
            Provider::LlamaCpp.health_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/health"
        );
        assert_eq!(
            Provider::Ollama.health_url("http://127.0.0.1:11434"),
            "http://127.0.0.1:11434/"
        );
    }
}
