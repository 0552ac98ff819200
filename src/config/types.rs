use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Glean
///
/// Every section and key is optional; missing values fall back to the
/// defaults documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of documents to emit (default 100)
    pub max_pages: usize,

    /// Maximum link depth from the seed URL (default 5)
    pub max_depth: u32,

    /// Minimum spacing between requests to the same host, in seconds (default 1.0)
    pub delay_seconds: f64,

    /// Per-request timeout in seconds (default 10)
    pub timeout_seconds: u64,

    /// Only follow links whose path contains this substring
    pub url_pattern: Option<String>,

    /// Whether robots.txt rules are honored (default true)
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 5,
            delay_seconds: 1.0,
            timeout_seconds: 10,
            url_pattern: None,
            respect_robots: true,
        }
    }
}

impl CrawlerConfig {
    /// The configured politeness delay
    ///
    /// Negative or NaN values read as no delay; values too large for a
    /// `Duration` saturate.
    pub fn delay(&self) -> Duration {
        if self.delay_seconds.is_nan() || self.delay_seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::MAX)
    }

    /// The configured request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Retry and backoff configuration for page fetches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total attempts per URL, including the first (default 4)
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds (default 300)
    pub base_delay_ms: u64,

    /// Upper bound for any single backoff wait, in milliseconds (default 10000)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 300,
            max_delay_ms: 10_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Product token, also used for robots.txt group matching
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "GleanBot".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`, with the
    /// parenthesised part omitted when no contact details are configured.
    pub fn header_value(&self) -> String {
        let contact: Vec<String> = [
            self.contact_url.as_ref().map(|u| format!("+{}", u)),
            self.contact_email.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if contact.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contact.join("; ")
            )
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSONL output file
    pub path: String,

    /// Append to an existing file instead of overwriting it
    pub append: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "output.jsonl".to_string(),
            append: false,
        }
    }
}
