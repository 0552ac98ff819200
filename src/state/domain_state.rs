use std::time::{Duration, Instant};

/// Tracks the request timing of one host during crawling
///
/// The politeness delay is measured from the previous request to the same
/// host, so time spent parsing a page counts toward the wait.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Timestamp of the last request to this host
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with no recorded requests
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a request was made to this host
    pub fn record_request(&mut self, now: Instant) {
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns `Duration::ZERO` for the first request to a host.
    pub fn time_until_next_request(&self, delay: Duration, now: Instant) -> Duration {
        match self.last_request_time {
            Some(last) => delay.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

/// The larger of the configured delay and the server's Crawl-delay
pub fn effective_delay(configured: Duration, crawl_delay: Option<Duration>) -> Duration {
    crawl_delay.map_or(configured, |robots| configured.max(robots))
}
