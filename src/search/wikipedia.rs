//! Wikipedia page summaries.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

const API: &str = "https://en.wikipedia.org/w/api.php";

/// MediaWiki extracts client.
#[derive(Debug, Clone)]
pub struct Wikipedia {
    http: reqwest::Client,
    api: Url,
    trim_sentences: Option<usize>,
}

impl Wikipedia {
    /// Client for English Wikipedia. `trim_sentences` keeps only the first
    /// N sentences of each summary.
    pub fn new(trim_sentences: Option<usize>) -> Result<Self> {
        Self::with_endpoint(API, trim_sentences)
    }

    /// Client for another MediaWiki API endpoint.
    pub fn with_endpoint(api: &str, trim_sentences: Option<usize>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            api: Url::parse(api)?,
            trim_sentences,
        })
    }

    /// Plain-text introduction of the page titled `title`.
    pub async fn summary(&self, title: &str) -> Result<String> {
        let body: serde_json::Value = self
            .http
            .get(self.api.clone())
            .query(&[
                ("format", "json"),
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", ""),
                ("explaintext", ""),
                ("redirects", "1"),
                ("titles", title),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let extract = parse_extract(&body)?;
        Ok(match self.trim_sentences {
            Some(n) => trim_sentences(&extract, n),
            None => extract,
        })
    }
}

/// Page title from a Wikipedia article URL (its last path segment).
pub fn page_title(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

/// The `extract` of the first page in an extracts API response.
pub fn parse_extract(body: &serde_json::Value) -> Result<String> {
    body.pointer("/query/pages")
        .and_then(serde_json::Value::as_object)
        .and_then(|pages| pages.values().next())
        .and_then(|page| page.get("extract"))
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| Error::UnexpectedResponse {
            service: "wikipedia",
            detail: "response has no page extract".to_string(),
        })
}

/// First `count` `.`-separated sentences of `text`, re-terminated with `.`.
pub fn trim_sentences(text: &str, count: usize) -> String {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(count)
        .collect();
    if sentences.is_empty() {
        return String::new();
    }
    format!("{}.", sentences.join(". "))
}
