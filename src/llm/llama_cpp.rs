//! llama.cpp server driver.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};

use super::{LlmDriver, Provider};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    content: String,
}

/// Driver for the llama.cpp HTTP server.
#[derive(Debug, Clone)]
pub struct LlamaCppDriver {
    http: reqwest::Client,
    base_url: String,
    n_predict: u32,
}

impl LlamaCppDriver {
    /// Driver for the server at `base_url`.
    pub fn new(base_url: impl Into<String>, n_predict: u32) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.into(),
            n_predict,
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for LlamaCppDriver {
    fn provider(&self) -> Provider {
        Provider::LlamaCpp
    }

    async fn is_online(&self) -> bool {
        let url = Provider::LlamaCpp.health_url(&self.base_url);
        let resp = match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(name: "llm.backend.offline", backend = "llama.cpp", error = %e, "There was an error connecting to llama.cpp");
                return false;
            }
        };
        if resp.status() != StatusCode::OK {
            warn!(name: "llm.backend.offline", backend = "llama.cpp", status = %resp.status(), "llama.cpp is offline or returning a bad status");
            return false;
        }
        match resp.json::<HealthBody>().await {
            Ok(body) if body.status == "ok" => {
                info!(backend = "llama.cpp", "llama.cpp is online");
                true
            }
            Ok(body) => {
                warn!(name: "llm.backend.offline", backend = "llama.cpp", status = %body.status, "llama.cpp is not ready");
                false
            }
            Err(e) => {
                warn!(name: "llm.backend.offline", backend = "llama.cpp", error = %e, "llama.cpp health check returned an unreadable body");
                false
            }
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/completion", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "prompt": prompt,
            "n_predict": self.n_predict,
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::BackendUnreachable {
                backend: "llama.cpp",
                source,
            })?;
        if resp.status() != StatusCode::OK {
            return Err(Error::BackendStatus(resp.status().as_u16()));
        }

        let completion: CompletionBody = resp.json().await?;
        Ok(completion.content)
    }
}
