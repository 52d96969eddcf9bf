//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the user agent and custom headers
//! - GET requests for pages and scripts
//! - Bounded retry for transient failures
//! - Error classification

use crate::config::{build_header_map, Config};
use crate::state::PageStatus;
use crate::RippleError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Maximum number of redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body decoded as text
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The page status this error maps to
        status: PageStatus,
    },

    /// Network error (connection refused, timeout, redirect loop, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The page status this error maps to
        status: PageStatus,
        /// Whether a retry could plausibly succeed
        retryable: bool,
    },
}

impl FetchResult {
    /// Returns the page status corresponding to this result
    pub fn status(&self) -> PageStatus {
        match self {
            Self::Success { .. } => PageStatus::Processed,
            Self::HttpError { status, .. } | Self::NetworkError { status, .. } => *status,
        }
    }

    /// Returns true for failures worth another attempt (5xx, timeouts, refused connections)
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Success { .. } => false,
            Self::HttpError { status_code, .. } => *status_code >= 500,
            Self::NetworkError { retryable, .. } => *retryable,
        }
    }

    /// Human-readable description of a failure
    pub fn describe(&self) -> String {
        match self {
            Self::Success { status_code, .. } => format!("HTTP {}", status_code),
            Self::HttpError { status_code, .. } => format!("HTTP {}", status_code),
            Self::NetworkError { error, .. } => error.clone(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client carries the crawler's User-Agent, the per-request timeout, and
/// every custom header from the configuration. Custom headers are applied
/// last, so a `User-Agent` entry in them replaces the crawler's own.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(RippleError)` - A header was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use endpoint_ripple::config::Config;
/// use endpoint_ripple::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, RippleError> {
    let headers = build_header_map(&config.headers)?;
    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

    let client = Client::builder()
        .user_agent(config.user_agent.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches a URL once and classifies the outcome
///
/// # Status Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 404 / 410 | HttpError → DeadLink |
/// | Other HTTP status | HttpError → HttpError |
/// | Timeout | NetworkError → Unreachable (retryable) |
/// | Connection refused | NetworkError → Unreachable (retryable) |
/// | Redirect loop / too many redirects | NetworkError → Failed |
/// | Unreadable body | NetworkError → Failed |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            status: PageStatus::DeadLink,
        };
    }

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            status: PageStatus::HttpError,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
            status: PageStatus::Failed,
            retryable: e.is_timeout(),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            status: PageStatus::Unreachable,
            retryable: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            status: PageStatus::Unreachable,
            retryable: true,
        }
    } else if e.is_redirect() {
        FetchResult::NetworkError {
            error: format!("Redirect error: {}", e),
            status: PageStatus::Failed,
            retryable: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            status: PageStatus::Failed,
            retryable: false,
        }
    }
}

/// Shared page fetcher for one crawl run
///
/// Cloning is cheap; all clones share the same connection pool and the same
/// limit on requests in flight, which covers page and script fetches alike.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    in_flight: Arc<Semaphore>,
    retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &Config) -> Result<Self, RippleError> {
        Ok(Self {
            client: build_http_client(config)?,
            in_flight: Arc::new(Semaphore::new(config.crawler.max_concurrent_fetches.max(1))),
            retries: config.crawler.retries,
            retry_delay: Duration::from_millis(config.crawler.retry_delay_ms),
        })
    }

    /// Fetches a URL, retrying transient failures up to the configured limit
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let mut attempt = 0;

        loop {
            let result = match self.in_flight.acquire().await {
                Ok(_permit) => fetch_url(&self.client, url.as_str()).await,
                Err(_) => FetchResult::NetworkError {
                    error: "Fetcher shut down".to_string(),
                    status: PageStatus::Failed,
                    retryable: false,
                },
            };

            if attempt >= self.retries || !result.is_retryable() {
                return result;
            }

            attempt += 1;
            tracing::debug!(
                "Retrying {} after {} (attempt {}/{})",
                url,
                result.describe(),
                attempt,
                self.retries
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}
