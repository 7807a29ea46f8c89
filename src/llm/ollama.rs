//! Ollama driver.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};

use super::{LlmDriver, Provider};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
const READY_BANNER: &str = "Ollama is running";

#[derive(Debug, Deserialize)]
struct GenerateBody {
    response: String,
}

/// Driver for an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaDriver {
    http: reqwest::Client,
    base_url: String,
    generate_url: String,
    model: String,
}

impl OllamaDriver {
    /// Driver probing `base_url` and generating through `generate_url`.
    pub fn new(
        base_url: impl Into<String>,
        generate_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.into(),
            generate_url: generate_url.into(),
            model: model.into(),
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for OllamaDriver {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    async fn is_online(&self) -> bool {
        let url = Provider::Ollama.health_url(&self.base_url);
        let resp = match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(name: "llm.backend.offline", backend = "ollama", error = %e, "There was an error connecting to ollama");
                return false;
            }
        };
        if resp.status() != StatusCode::OK {
            warn!(name: "llm.backend.offline", backend = "ollama", status = %resp.status(), "ollama is offline or returning a bad status");
            return false;
        }
        match resp.text().await {
            Ok(text) if text.trim() == READY_BANNER => {
                info!(backend = "ollama", "ollama is online");
                true
            }
            Ok(_) => {
                warn!(name: "llm.backend.offline", backend = "ollama", "ollama answered without its ready banner");
                false
            }
            Err(e) => {
                warn!(name: "llm.backend.offline", backend = "ollama", error = %e, "ollama health check failed");
                false
            }
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let resp = self
            .http
            .post(&self.generate_url)
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::BackendUnreachable {
                backend: "ollama",
                source,
            })?;
        if resp.status() != StatusCode::OK {
            return Err(Error::BackendStatus(resp.status().as_u16()));
        }

        let generated: GenerateBody = resp.json().await?;
        Ok(generated.response)
    }
}
