//! Crawler module for web page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and backoff
//! - Link extraction from fetched pages
//! - The breadth-first frontier and visited set
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod links;
mod retry;

pub use coordinator::{crawl, CrawlEvent, Crawler, FailEvent, SkipEvent, SkipReason};
pub use fetcher::{build_http_client, FetchError, FetchOutcome, Fetcher};
pub use frontier::{CrawlTask, Frontier, VisitedSet};
pub use links::extract_links;
pub use retry::RetryPolicy;
