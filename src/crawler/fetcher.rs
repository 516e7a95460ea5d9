//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a descriptive user agent
//! - GET requests returning the raw body and MIME essence
//! - Error classification
//!
//! Failed fetches are never retried; the caller logs them and drops the URL.

use crate::config::{CrawlConfig, UserAgentConfig};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// A 2xx response whose body was read completely
    Stored {
        /// MIME essence of the `Content-Type` header (empty if absent)
        content_type: String,
        body: Vec<u8>,
    },

    Failed(FetchFailure),
}

/// Why a fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Network(format!("connection failed: {}", e))
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sitegraph::config::Config;
/// use sitegraph::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.crawl).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawl: &CrawlConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = crawl.request_timeout();

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches `url` with a single GET request
///
/// Redirects are followed by the client; the document is attributed to the
/// requested URL.
pub async fn fetch(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Failed(e.into()),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::Failed(FetchFailure::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(mime_essence)
        .unwrap_or_default();

    match response.bytes().await {
        Ok(body) => FetchOutcome::Stored {
            content_type,
            body: body.to_vec(),
        },
        Err(e) if e.is_timeout() => FetchOutcome::Failed(FetchFailure::Timeout),
        Err(e) => FetchOutcome::Failed(FetchFailure::Body(e.to_string())),
    }
}

/// Reduces a `Content-Type` value to the text before the first `;`, trimmed
pub fn mime_essence(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
