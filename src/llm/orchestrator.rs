//! Research-then-answer pipeline.
//!
//! The orchestrator owns one answer from start to finish:
//! 1. Probe the backend; an offline backend short-circuits with a notice
//! 2. Gather Wikipedia, web and news results, recording every cited URL
//! 3. Wrap the results in the answering prompt
//! 4. Complete it and drop a trailing half sentence
//!
//! Backend failures never surface as errors. They become the answer text so
//! the page and the terminal always have something to show.
//!
//! # Example
//!
//! ```rust,ignore
//! use clap::Parser;
//! use laiser::config::{AppConfig, Cli};
//! use laiser::llm::Orchestrator;
//!
//! let config = AppConfig::from_cli(&Cli::parse())?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//! let answer = orchestrator.answer("what is rust?").await;
//! println!("{}\n{}", answer.text, answer.to_plain());
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::search::{DuckDuckGo, SearchProvider, SourceLinks, WebSearch, Wikipedia, format};

use super::prompt::{build_prompt, remove_incomplete_sentence};
use super::{LlmDriver, build_driver};

/// How much to gather per question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchSettings {
    /// Web results per question.
    pub result_count: usize,
    /// News results per question.
    pub news_result_count: usize,
    /// Pause after each research step.
    pub query_delay: Duration,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            result_count: 5,
            news_result_count: 5,
            query_delay: Duration::from_millis(200),
        }
    }
}

/// Material gathered for one question.
#[derive(Debug, Clone, Default)]
pub struct Research {
    /// Prompt blocks, in research order.
    pub context: String,
    /// Every URL the blocks cite.
    pub sources: SourceLinks,
}

/// Final answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Model output, or the reason there is none.
    pub text: String,
    /// Cited URLs.
    pub sources: Vec<String>,
}

impl Answer {
    /// Answer fragment for the chat page.
    pub fn to_html(&self) -> Result<String> {
        format::render_answer_html(&self.text, &self.sources)
    }

    /// Sources for the terminal, one per line.
    pub fn to_plain(&self) -> String {
        format::render_sources_plain(&self.sources)
    }
}

/// Answers questions from web research and a local model.
#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn LlmDriver>,
    search: Arc<dyn SearchProvider>,
    settings: ResearchSettings,
}

#[allow(clippy::missing_fields_in_debug)]
impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("backend", &self.llm.provider())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Orchestrator {
    /// Orchestrator over explicit backends.
    pub fn new(
        llm: Arc<dyn LlmDriver>,
        search: Arc<dyn SearchProvider>,
        settings: ResearchSettings,
    ) -> Self {
        Self {
            llm,
            search,
            settings,
        }
    }

    /// Orchestrator over the configured backend and the public web.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let llm = build_driver(&config.llm_settings())?;
        let search = WebSearch::new(
            DuckDuckGo::new()?,
            Wikipedia::new(config.wikipedia_trim())?,
        );
        Ok(Self::new(llm, Arc::new(search), config.research_settings()))
    }

    /// Gather the prompt material for `query`.
    ///
    /// A step that fails is logged and left out.
    pub async fn research(&self, query: &str) -> Research {
        let mut research = Research::default();

        match self.search.wikipedia(query).await {
            Ok(Some(wiki)) => {
                research.sources.push(wiki.url.clone());
                research.context.push_str(&format::wikipedia_block(&wiki));
                research.context.push('\n');
            }
            Ok(None) => debug!(step = "wikipedia", "No Wikipedia page found"),
            Err(e) => warn!(step = "wikipedia", error = %e, "Research step failed"),
        }
        self.pause().await;

        match self.search.text(query, self.settings.result_count).await {
            Ok(hits) => {
                research
                    .sources
                    .extend(hits.iter().map(|hit| hit.href.clone()));
                research.context.push_str(&format::search_block(&hits));
                research.context.push('\n');
            }
            Err(e) => warn!(step = "web", error = %e, "Research step failed"),
        }
        self.pause().await;

        match self
            .search
            .news(query, self.settings.news_result_count)
            .await
        {
            Ok(hits) => {
                research
                    .sources
                    .extend(hits.iter().map(|hit| hit.url.clone()));
                research.context.push_str(&format::news_block(&hits));
                research.context.push('\n');
            }
            Err(e) => warn!(step = "news", error = %e, "Research step failed"),
        }
        self.pause().await;

        research
    }

    /// Answer `query`.
    pub async fn answer(&self, query: &str) -> Answer {
        let backend = self.llm.provider();
        if !self.llm.is_online().await {
            return Answer {
                text: format!(
                    "{backend} server is offline or status is not 'ok'.\n\
                     Please check your {backend} settings.\n"
                ),
                sources: Vec::new(),
            };
        }

        let research = self.research(query).await;
        info!(
            backend = %backend,
            sources = research.sources.as_slice().len(),
            "Research complete, asking the model"
        );

        let prompt = build_prompt(query, &research.context);
        let text = match self.llm.complete(&prompt).await {
            Ok(text) => remove_incomplete_sentence(&text),
            Err(e) => {
                warn!(backend = %backend, error = %e, "Completion failed");
                e.to_string()
            }
        };

        Answer {
            text,
            sources: research.sources.into_vec(),
        }
    }

    async fn pause(&self) {
        if !self.settings.query_delay.is_zero() {
            tokio::time::sleep(self.settings.query_delay).await;
        }
    }
}
