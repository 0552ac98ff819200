//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Rules are loaded lazily the first time a server is consulted and kept for the
//! rest of the run.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache, RobotsSource};
pub use parser::{RobotsRuleSet, MAX_CRAWL_DELAY};

use crate::url::NormalizedUrl;
use reqwest::Client;
use std::time::Duration;

/// Robots.txt policy for one crawl run
///
/// When robots checking is disabled every URL is allowed and no crawl delay
/// is reported. When a robots.txt file cannot be loaded the policy fails open:
/// an unreachable robots file must not stall an otherwise-legal crawl.
pub struct RobotsPolicy {
    client: Client,
    agent: String,
    timeout: Duration,
    enabled: bool,
    cache: RobotsCache,
}

impl RobotsPolicy {
    /// Creates a policy
    ///
    /// * `agent` - the product token matched against `User-agent` lines
    /// * `enabled` - whether robots.txt is consulted at all
    pub fn new(client: Client, agent: &str, timeout: Duration, enabled: bool) -> Self {
        Self {
            client,
            agent: agent.to_string(),
            timeout,
            enabled,
            cache: RobotsCache::new(),
        }
    }

    /// Checks whether `url` may be fetched
    pub async fn allowed(&mut self, url: &NormalizedUrl) -> bool {
        if !self.enabled {
            return true;
        }

        self.load(url).await;
        self.cache
            .get(&url.origin())
            .map_or(true, |cached| cached.rules.is_allowed(url.as_str()))
    }

    /// The Crawl-delay declared for the server hosting `url`
    pub async fn crawl_delay(&mut self, url: &NormalizedUrl) -> Option<Duration> {
        if !self.enabled {
            return None;
        }

        self.load(url).await;
        self.cache
            .get(&url.origin())
            .and_then(|cached| cached.rules.crawl_delay())
    }

    /// The cached rules for an origin, if it has been loaded
    pub fn cached(&self, origin: &str) -> Option<&CachedRobots> {
        self.cache.get(origin)
    }

    async fn load(&mut self, url: &NormalizedUrl) {
        let origin = url.origin();
        if self.cache.contains(&origin) {
            return;
        }

        let robots = fetch_robots(&self.client, &origin, &self.agent, self.timeout).await;
        self.cache.insert(origin, robots);
    }
}

/// Fetches and parses `/robots.txt` for an origin
///
/// Never fails: a 4xx answer yields an empty rule set, and network errors or
/// 5xx answers yield a permissive entry marked [`RobotsSource::Unavailable`].
pub async fn fetch_robots(
    client: &Client,
    origin: &str,
    agent: &str,
    timeout: Duration,
) -> CachedRobots {
    let robots_url = format!("{}/robots.txt", origin);
    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Could not load {}: {}; allowing all", robots_url, e);
            return CachedRobots::unavailable();
        }
    };

    let status = response.status();
    if status.is_client_error() {
        tracing::info!("No robots.txt at {} (HTTP {})", robots_url, status.as_u16());
        return CachedRobots::new(RobotsRuleSet::allow_all(), RobotsSource::Missing);
    }
    if !status.is_success() {
        tracing::warn!(
            "Could not load {}: HTTP {}; allowing all",
            robots_url,
            status.as_u16()
        );
        return CachedRobots::unavailable();
    }

    match response.text().await {
        Ok(body) => {
            let rules = RobotsRuleSet::parse(&body, agent);
            tracing::info!(
                "Loaded {} ({} disallow rules, crawl-delay {:?})",
                robots_url,
                rules.disallow_patterns().len(),
                rules.crawl_delay()
            );
            CachedRobots::new(rules, RobotsSource::Fetched)
        }
        Err(e) => {
            tracing::warn!("Could not read {}: {}; allowing all", robots_url, e);
            CachedRobots::unavailable()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn policy(enabled: bool) -> RobotsPolicy {
        RobotsPolicy::new(Client::new(), "TestBot", Duration::from_secs(5), enabled)
    }

    #[tokio::test]
    async fn test_disallow_rules_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: *\nDisallow: /private\nCrawl-delay: 2"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut robots = policy(true);
        let private = normalize(&format!("{}/private/page", server.uri()), None).unwrap();
        let public = normalize(&format!("{}/public", server.uri()), None).unwrap();

        assert!(!robots.allowed(&private).await);
        assert!(robots.allowed(&public).await);
        assert_eq!(robots.crawl_delay(&public).await, Some(Duration::from_secs(2)));
        assert_eq!(
            robots.cached(&public.origin()).unwrap().source,
            RobotsSource::Fetched
        );
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut robots = policy(true);
        let page = normalize(&format!("{}/anything", server.uri()), None).unwrap();

        assert!(robots.allowed(&page).await);
        assert_eq!(robots.crawl_delay(&page).await, None);
        assert_eq!(
            robots.cached(&page.origin()).unwrap().source,
            RobotsSource::Missing
        );
    }

    #[tokio::test]
    async fn test_server_error_fails_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut robots = policy(true);
        let page = normalize(&format!("{}/anything", server.uri()), None).unwrap();

        assert!(robots.allowed(&page).await);
        assert_eq!(
            robots.cached(&page.origin()).unwrap().source,
            RobotsSource::Unavailable
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_open() {
        let mut robots = policy(true);
        // Port 9 (discard) on localhost is not expected to be listening
        let page = normalize("http://127.0.0.1:9/page", None).unwrap();

        assert!(robots.allowed(&page).await);
        assert_eq!(robots.crawl_delay(&page).await, None);
    }

    #[tokio::test]
    async fn test_disabled_policy_never_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
            .expect(0)
            .mount(&server)
            .await;

        let mut robots = policy(false);
        let page = normalize(&format!("{}/page", server.uri()), None).unwrap();

        assert!(robots.allowed(&page).await);
        assert_eq!(robots.crawl_delay(&page).await, None);
        assert!(robots.cached(&page.origin()).is_none());
    }
}
