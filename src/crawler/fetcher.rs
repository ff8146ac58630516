//! HTTP fetcher
//!
//! Builds the shared HTTP client and performs single GET requests, mapping
//! every failure into a [`FetchError`] the crawler can turn into a skip.
//! Redirects are not followed here; each hop goes back to the crawler so it
//! passes the same dedup, robots and politeness checks as a fresh link.

use crate::config::Config;
use reqwest::{header::LOCATION, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for one link
pub const MAX_REDIRECTS: usize = 10;

/// Failure to obtain a page body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Disallowed by robots.txt")]
    RobotsDenied,

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Crawl cancelled before the request was sent")]
    Cancelled,

    #[error("Redirect error: {0}")]
    Redirect(String),

    #[error("Redirect target {0} was already visited")]
    AlreadyVisited(String),
}

/// Result of a single GET without redirect following
#[derive(Debug, Clone)]
pub enum FetchResponse {
    /// A 2xx response with its body
    Page(FetchedPage),
    /// A 3xx response, with the `Location` resolved against the request URL
    Redirect(Url),
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    pub body: String,
}

impl FetchedPage {
    /// Whether the body is HTML (or untyped, which is treated as HTML)
    pub fn is_html(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        ct.is_empty() || ct.contains("text/html") || ct.contains("application/xhtml")
    }

    /// Whether the body is plain text that needs no HTML parsing
    pub fn is_plain_text(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("text/plain")
    }
}

/// Builds an HTTP client with the configured user agent and timeouts
///
/// Redirects are handled manually by the crawler.
///
/// # Example
///
/// ```
/// use keyword_scout::config::Config;
/// use keyword_scout::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.value.clone())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchResponse::Page)` |
/// | 3xx with `Location` | `Ok(FetchResponse::Redirect)` |
/// | 3xx with a missing or unusable `Location` | `FetchError::Redirect` |
/// | Other status | `FetchError::Http` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection/DNS/TLS error | `FetchError::Network` |
/// | Undecodable body | `FetchError::Body` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchResponse, FetchError> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                FetchError::Redirect(format!("HTTP {} without Location", status.as_u16()))
            })?;
        let target = response
            .url()
            .join(location)
            .map_err(|e| FetchError::Redirect(format!("bad Location {:?}: {}", location, e)))?;
        return Ok(FetchResponse::Redirect(target));
    }

    if !status.is_success() {
        return Err(FetchError::Http {
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Body(e.to_string())
        }
    })?;

    Ok(FetchResponse::Page(FetchedPage {
        final_url,
        content_type,
        body,
    }))
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}
