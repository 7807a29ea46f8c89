//! Web research for a question.
//!
//! [`SearchProvider`] is the seam between the orchestrator and the outside
//! world. [`WebSearch`] implements it over DuckDuckGo and Wikipedia.
//!
//! # Modules
//!
//! - [`duckduckgo`]: HTML text results and JSON news results
//! - [`wikipedia`]: page summaries from the MediaWiki extracts API
//! - [`format`]: prompt blocks and answer rendering

pub mod duckduckgo;
pub mod format;
pub mod wikipedia;

pub use duckduckgo::DuckDuckGo;
pub use wikipedia::Wikipedia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextHit {
    /// Page title.
    pub title: String,
    /// Target URL.
    pub href: String,
    /// Snippet / meta description.
    pub body: String,
}

/// One news search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsHit {
    /// Article title.
    pub title: String,
    /// Article URL.
    pub url: String,
    /// Summary.
    pub body: String,
    /// Publishing outlet.
    pub source: String,
}

/// Introductory summary of a Wikipedia page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiSummary {
    /// Page URL.
    pub url: String,
    /// Plain-text extract.
    pub summary: String,
}

/// Source of research material for the prompt.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Web results for `query`, at most `max_results`.
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<TextHit>>;

    /// News results for `query`, at most `max_results`.
    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<NewsHit>>;

    /// Summary of the most relevant Wikipedia page, if any.
    async fn wikipedia(&self, query: &str) -> Result<Option<WikiSummary>>;
}

/// URLs cited while answering one question, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLinks {
    links: Vec<String>,
}

impl SourceLinks {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a link; duplicates are ignored.
    pub fn push(&mut self, link: impl Into<String>) {
        let link = link.into();
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }

    /// Recorded links.
    pub fn as_slice(&self) -> &[String] {
        &self.links
    }

    /// Take the recorded links.
    pub fn into_vec(self) -> Vec<String> {
        self.links
    }
}

impl Extend<String> for SourceLinks {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for link in iter {
            self.push(link);
        }
    }
}

/// [`SearchProvider`] backed by DuckDuckGo and Wikipedia.
#[derive(Debug, Clone)]
pub struct WebSearch {
    ddg: DuckDuckGo,
    wikipedia: Wikipedia,
}

impl WebSearch {
    /// Combine the two services.
    pub fn new(ddg: DuckDuckGo, wikipedia: Wikipedia) -> Self {
        Self { ddg, wikipedia }
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<TextHit>> {
        self.ddg.text(query, max_results).await
    }

    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<NewsHit>> {
        self.ddg.news(query, max_results).await
    }

    async fn wikipedia(&self, query: &str) -> Result<Option<WikiSummary>> {
        let hits = self
            .ddg
            .text(&format!("site:wikipedia.org {query}"), 1)
            .await?;
        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };
        let Some(title) = wikipedia::page_title(&hit.href) else {
            return Ok(None);
        };
        let summary = self.wikipedia.summary(&title).await?;
        Ok(Some(WikiSummary {
            url: hit.href,
            summary,
        }))
    }
}
