//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like default headers
//! - GET requests to fetch page content
//! - Error classification

use crate::config::HttpConfig;
use reqwest::Client;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Request did not complete within the client timeout
    Timeout,

    /// Network error (connection refused, TLS failure, broken body, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client sends the configured user agent and the default header set
/// from [`HttpConfig::header_map`], follows redirects and decompresses gzip
/// and brotli bodies.
///
/// # Example
///
/// ```no_run
/// use sumi_scroll::config::HttpConfig;
/// use sumi_scroll::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> crate::Result<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(config.header_map()?)
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches pages over a shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> crate::Result<Self> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetches a URL, classifying every failure instead of returning an error
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with readable body | `Success` |
    /// | Any other status | `HttpError` |
    /// | Client timeout | `Timeout` |
    /// | Connection, TLS or body error | `NetworkError` |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        match response.text().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body,
            },
            Err(e) => classify_error(e),
        }
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Timeout
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}
