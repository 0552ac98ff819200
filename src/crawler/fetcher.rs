//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::RetryPolicy;
use crate::url::{normalize, NormalizedUrl};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Content types accepted as HTML documents
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Why a fetch did not produce a document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    Http { status: u16 },
}

impl FetchError {
    /// Timeouts, connection failures, 429 and 5xx are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Http { status } => *status == 429 || (500..600).contains(status),
        }
    }
}

impl From<reqwest::Error> for FetchError {
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

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// An HTML document was received
    Ok {
        html: String,
        status_code: u16,
        /// Where the response came from after redirects
        final_url: NormalizedUrl,
        /// Attempts made, including the successful one
        attempts: u32,
    },

    /// The server answered, but not with HTML
    Skipped { reason: String },

    /// No document after all attempts, or a non-retryable failure
    Failed { error: FetchError, attempts: u32 },
}

/// One failed attempt, with the server's Retry-After hint if it sent one
struct AttemptFailure {
    error: FetchError,
    retry_after: Option<Duration>,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use glean::config::UserAgentConfig;
/// use glean::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a timeout and a retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            retry,
            timeout,
        }
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx, HTML | Ok |
    /// | HTTP 2xx, other content type | Skipped |
    /// | HTTP 429, 5xx | Retry with backoff, honoring Retry-After |
    /// | Timeout, connection failure | Retry with backoff |
    /// | Other HTTP status (404, 403, ...) | Immediate Failed |
    pub async fn fetch(&self, url: &NormalizedUrl) -> FetchOutcome {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let failure = match self.attempt(url).await {
                Ok(response) => return self.read_document(url, response, attempts).await,
                Err(failure) => failure,
            };

            if !failure.error.is_retryable() || !self.retry.should_retry(attempts) {
                tracing::debug!(
                    "Giving up on {} after {} attempt(s): {}",
                    url,
                    attempts,
                    failure.error
                );
                return FetchOutcome::Failed {
                    error: failure.error,
                    attempts,
                };
            }

            let wait = self
                .retry
                .wait_before_retry(attempts - 1, failure.retry_after);
            tracing::info!(
                "Retrying {} in {:?} (attempt {}/{}): {}",
                url,
                wait,
                attempts + 1,
                self.retry.max_attempts(),
                failure.error
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Sends one GET request; non-2xx statuses become failures
    async fn attempt(&self, url: &NormalizedUrl) -> Result<Response, AttemptFailure> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AttemptFailure {
                error: e.into(),
                retry_after: None,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(AttemptFailure {
            error: FetchError::Http {
                status: status.as_u16(),
            },
            retry_after: retry_after(&response),
        })
    }

    async fn read_document(
        &self,
        url: &NormalizedUrl,
        response: Response,
        attempts: u32,
    ) -> FetchOutcome {
        let status_code = response.status().as_u16();
        let final_url = normalize(response.url().as_str(), None).unwrap_or_else(|_| url.clone());
        if &final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        if let Some(content_type) = content_type {
            if !HTML_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
                tracing::debug!("Skipping {}: content type {}", url, content_type);
                return FetchOutcome::Skipped {
                    reason: format!("content type {}", content_type),
                };
            }
        }

        match response.text().await {
            Ok(html) => FetchOutcome::Ok {
                html,
                status_code,
                final_url,
                attempts,
            },
            Err(e) => FetchOutcome::Failed {
                error: e.into(),
                attempts,
            },
        }
    }
}

/// Parses a `Retry-After` header given in seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
