//! Client side of `POST /search`.

use async_trait::async_trait;
use url::Url;

use crate::contract::{SEARCH_PATH, SearchForm, SearchResponse};

use super::dom::UiError;

/// Issues the search request for a submitted form.
///
/// Futures are not `Send`: in the browser they run on the UI thread.
#[async_trait(?Send)]
pub trait SearchClient {
    /// Post the form and decode the JSON answer.
    async fn search(&self, form: &SearchForm) -> Result<SearchResponse, UiError>;
}

/// [`SearchClient`] over `reqwest`; uses `fetch` when compiled to wasm.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpSearchClient {
    /// Client for the search endpoint under `base` (e.g. the page origin).
    pub fn new(base: &Url) -> Result<Self, UiError> {
        let endpoint = base
            .join(SEARCH_PATH)
            .map_err(|e| UiError::Request(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl SearchClient for HttpSearchClient {
    async fn search(&self, form: &SearchForm) -> Result<SearchResponse, UiError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| UiError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| UiError::Request(e.to_string()))?;

        resp.json::<SearchResponse>()
            .await
            .map_err(|e| UiError::Decode(e.to_string()))
    }
}
