//! HTTP page fetching using reqwest.

use std::time::Duration;

use reqwest::{header, Client};

use crate::error::{Error, Result};

/// Source of raw HTML pages.
///
/// Implemented over HTTP in production and by in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetch the page body at `url`.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// reqwest-backed page fetcher
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client with the given user agent and request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("text/html,application/xhtml+xml"),
        );

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| Error::fetch(url, e))?;
        if body.trim().is_empty() {
            return Err(Error::parse(url, "empty response body"));
        }

        Ok(body)
    }
}
