//! DuckDuckGo web and news search.
//!
//! Web results come from the JavaScript-free HTML endpoint. News results come
//! from `news.js`, which needs the per-query `vqd` token found in the regular
//! results page.

use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::{NewsHit, TextHit};

const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const SITE: &str = "https://duckduckgo.com/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SERVICE: &str = "duckduckgo";

/// DuckDuckGo client.
#[derive(Debug, Clone)]
pub struct DuckDuckGo {
    http: reqwest::Client,
    html_endpoint: Url,
    site: Url,
}

impl DuckDuckGo {
    /// Client for the public endpoints.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(HTML_ENDPOINT, SITE)
    }

    /// Client for custom endpoints (mirrors, tests).
    pub fn with_endpoints(html_endpoint: &str, site: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            html_endpoint: Url::parse(html_endpoint)?,
            site: Url::parse(site)?,
        })
    }

    /// Web results for `query`.
    pub async fn text(&self, query: &str, max_results: usize) -> Result<Vec<TextHit>> {
        debug!(query, max_results, "duckduckgo text search");
        let html = self
            .http
            .get(self.html_endpoint.clone())
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_html_results(&html, max_results)
    }

    /// News results for `query`.
    pub async fn news(&self, query: &str, max_results: usize) -> Result<Vec<NewsHit>> {
        debug!(query, max_results, "duckduckgo news search");
        let page = self
            .http
            .get(self.site.clone())
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let vqd = extract_vqd(&page).ok_or_else(|| Error::UnexpectedResponse {
            service: SERVICE,
            detail: "no vqd token in results page".to_string(),
        })?;

        let body: serde_json::Value = self
            .http
            .get(self.site.join("news.js")?)
            .query(&[
                ("l", "us-en"),
                ("o", "json"),
                ("noamp", "1"),
                ("q", query),
                ("vqd", vqd.as_str()),
                ("p", "-1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_news(&body, max_results)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::UnexpectedResponse {
        service: SERVICE,
        detail: format!("bad selector {css}: {e}"),
    })
}

/// Extract results from the HTML endpoint's page.
pub fn parse_html_results(html: &str, max_results: usize) -> Result<Vec<TextHit>> {
    let document = Html::parse_document(html);
    let result = selector(".result")?;
    let title = selector(".result__a")?;
    let snippet = selector(".result__snippet")?;

    let hits = document
        .select(&result)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_none_or(|class| !class.contains("result--ad"))
        })
        .filter_map(|el| {
            let anchor = el.select(&title).next()?;
            let href = resolve_result_href(anchor.value().attr("href")?)?;
            let body = el
                .select(&snippet)
                .next()
                .map(|s| s.text().collect::<String>())
                .unwrap_or_default();
            Some(TextHit {
                title: anchor.text().collect::<String>().trim().to_string(),
                href,
                body: body.trim().to_string(),
            })
        })
        .filter(|hit| !hit.title.is_empty())
        .take(max_results)
        .collect();
    Ok(hits)
}

/// Turn a result link into the target URL, unwrapping `/l/?uddg=` redirects.
pub fn resolve_result_href(href: &str) -> Option<String> {
    let base = Url::parse(SITE).ok()?;
    let url = base.join(href).ok()?;
    if url.path() == "/l/" {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned());
    }
    Some(url.into())
}

/// Find the `vqd` token in a results page.
pub fn extract_vqd(page: &str) -> Option<String> {
    let re = Regex::new(r#"vqd=["']?([0-9-]+)"#).ok()?;
    re.captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract hits from a `news.js` response.
pub fn parse_news(body: &serde_json::Value, max_results: usize) -> Result<Vec<NewsHit>> {
    let results = body
        .get("results")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| Error::UnexpectedResponse {
            service: SERVICE,
            detail: "news response has no results array".to_string(),
        })?;

    let field = |item: &serde_json::Value, key: &str| {
        item.get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(results
        .iter()
        .filter(|item| item.get("url").and_then(serde_json::Value::as_str).is_some())
        .take(max_results)
        .map(|item| NewsHit {
            title: strip_markup(&field(item, "title")),
            url: field(item, "url"),
            body: strip_markup(&field(item, "excerpt")),
            source: field(item, "source"),
        })
        .collect())
}

/// Plain text of an HTML snippet (`<b>` highlights, entities).
fn strip_markup(snippet: &str) -> String {
    Html::parse_fragment(snippet)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
