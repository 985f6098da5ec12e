// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page retrieval
//!
//! Thin wrapper over reqwest that hands the core pipeline raw bytes plus
//! response metadata. All network policy (timeouts, redirects, TLS) lives
//! here; the pipeline itself never performs I/O.

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::doc::ResponseHeader;
use crate::error::{Error, Result};

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("apiscope/", env!("CARGO_PKG_VERSION"));

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    /// Request timeout; carries the advisory `timeout_secs` scan setting
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
        }
    }
}

/// One fetched page, ready for normalization
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<ResponseHeader>,
    pub body: Vec<u8>,
}

/// HTTP page fetcher
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page and capture its response metadata.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let url = Url::parse(url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let headers: Vec<ResponseHeader> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                ResponseHeader::new(
                    name.as_str(),
                    value.to_str().unwrap_or_default(),
                )
            })
            .collect();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response.bytes().await?.to_vec();
        info!(url = final_url.as_str(), status, bytes = body.len(), "fetched page");

        Ok(FetchedPage {
            url: final_url,
            status,
            content_type,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_captures_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><body>hi</body></html>",
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let page = fetcher
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert!(page.content_type.as_deref().unwrap().starts_with("text/html"));
        assert!(String::from_utf8_lossy(&page.body).contains("hi"));
        assert!(page
            .headers
            .iter()
            .any(|h| h.name.eq_ignore_ascii_case("content-type")));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let fetcher = PageFetcher::new().unwrap();
        assert!(fetcher.fetch("ftp://example.com/x").await.is_err());
    }
}
