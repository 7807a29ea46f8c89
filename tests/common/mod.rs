#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use laiser::AppState;
use laiser::config::{AppConfig, Cli};
use laiser::error::{Error, Result};
use laiser::llm::{LlmDriver, Orchestrator, Provider, ResearchSettings};
use laiser::search::{NewsHit, SearchProvider, TextHit, WikiSummary};

/// Scripted model backend.
pub struct FakeLlm {
    pub online: bool,
    pub reply: std::result::Result<String, u16>,
    pub prompts: Mutex<Vec<String>>,
    /// When set, completions wait for a notification.
    pub gate: Option<Arc<Notify>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            online: true,
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            ..Self::replying("")
        }
    }
}

#[async_trait]
impl LlmDriver for FakeLlm {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    async fn is_online(&self) -> bool {
        self.online
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone().map_err(Error::BackendStatus)
    }
}

/// Research that never leaves the process.
pub struct FakeSearch;

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn text(&self, _query: &str, _max_results: usize) -> Result<Vec<TextHit>> {
        Ok(vec![TextHit {
            title: "The Rust Programming Language".to_string(),
            href: "https://www.rust-lang.org/".to_string(),
            body: "A language empowering everyone.".to_string(),
        }])
    }

    async fn news(&self, _query: &str, _max_results: usize) -> Result<Vec<NewsHit>> {
        Ok(vec![NewsHit {
            title: "Rust 2024 ships".to_string(),
            url: "https://blog.rust-lang.org/2024".to_string(),
            body: "The new edition is out.".to_string(),
            source: "Rust Blog".to_string(),
        }])
    }

    async fn wikipedia(&self, _query: &str) -> Result<Option<WikiSummary>> {
        Ok(Some(WikiSummary {
            url: "https://en.wikipedia.org/wiki/Rust_(programming_language)".to_string(),
            summary: "Rust is a general-purpose programming language.".to_string(),
        }))
    }
}

/// Built-in defaults, read through an empty INI file instead of `./settings.ini`.
pub fn test_config() -> AppConfig {
    let empty = tempfile::Builder::new()
        .suffix(".ini")
        .tempfile()
        .expect("Failed to create temp config");
    let cli = Cli {
        query: None,
        server: true,
        config: Some(empty.path().to_string_lossy().into_owned()),
        port: None,
        host: None,
    };
    AppConfig::from_cli(&cli).expect("default config")
}

pub fn state_with(llm: FakeLlm, config: AppConfig) -> AppState {
    let settings = ResearchSettings {
        query_delay: Duration::ZERO,
        ..ResearchSettings::default()
    };
    let orchestrator = Orchestrator::new(Arc::new(llm), Arc::new(FakeSearch), settings);
    AppState::new(orchestrator, config)
}

pub fn state(llm: FakeLlm) -> AppState {
    state_with(llm, test_config())
}
