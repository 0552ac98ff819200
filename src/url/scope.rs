//! Scope rules deciding which discovered links become crawl tasks

use crate::config::CrawlerConfig;
use crate::crawler::VisitedSet;
use crate::url::NormalizedUrl;
use std::fmt;

/// Path segments that mark non-content pages
const NON_CONTENT_SEGMENTS: &[&str] = &[
    "login", "logout", "signin", "signup", "register", "search", "admin", "api", "cart",
    "checkout",
];

/// File extensions of media and document downloads
const NON_CONTENT_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "svg", "webp", "ico", "zip", "gz", "tar", "exe", "dmg",
    "mp3", "mp4", "avi", "mov", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// Why a URL was kept out of the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRejection {
    /// Host or port differs from the seed's
    ForeignHost,
    /// Deeper than the configured maximum depth
    TooDeep,
    /// Login, search, admin, media download and similar
    NonContent,
    /// The configured URL pattern does not occur in the path
    PatternMismatch,
    /// Already fetched (or attempted) in this run
    AlreadyVisited,
}

impl fmt::Display for ScopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ForeignHost => "foreign host",
            Self::TooDeep => "beyond max depth",
            Self::NonContent => "non-content path",
            Self::PatternMismatch => "url pattern mismatch",
            Self::AlreadyVisited => "already visited",
        };
        f.write_str(reason)
    }
}

/// Admits or rejects URLs relative to one seed and one configuration
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    seed_host: String,
    seed_port: Option<u16>,
    max_depth: u32,
    url_pattern: Option<String>,
}

impl ScopeFilter {
    /// Creates a filter scoped to the seed's host
    pub fn new(seed: &NormalizedUrl, config: &CrawlerConfig) -> Self {
        Self {
            seed_host: seed.host().to_string(),
            seed_port: seed.port(),
            max_depth: config.max_depth,
            url_pattern: config.url_pattern.clone(),
        }
    }

    /// Returns true if `url` at `depth` may be enqueued
    ///
    /// Pure: depends only on the arguments and the filter's configuration.
    pub fn accept(&self, url: &NormalizedUrl, depth: u32, visited: &VisitedSet) -> bool {
        self.verdict(url, depth, visited).is_ok()
    }

    /// Like [`accept`](Self::accept) but reports the first failing rule
    pub fn verdict(
        &self,
        url: &NormalizedUrl,
        depth: u32,
        visited: &VisitedSet,
    ) -> Result<(), ScopeRejection> {
        self.check_rules(url, depth, false)?;
        if visited.contains(url) {
            return Err(ScopeRejection::AlreadyVisited);
        }
        Ok(())
    }

    /// Re-checks a dequeued task against every rule except the visited rule
    ///
    /// The seed is the user's explicit entry point and is exempt from the URL
    /// pattern; it is still subject to the non-content denylist.
    pub fn check_task(&self, url: &NormalizedUrl, depth: u32) -> Result<(), ScopeRejection> {
        self.check_rules(url, depth, depth == 0)
    }

    fn check_rules(
        &self,
        url: &NormalizedUrl,
        depth: u32,
        is_seed: bool,
    ) -> Result<(), ScopeRejection> {
        if url.host() != self.seed_host || url.port() != self.seed_port {
            return Err(ScopeRejection::ForeignHost);
        }

        if depth > self.max_depth {
            return Err(ScopeRejection::TooDeep);
        }

        if is_non_content_path(url.path()) {
            return Err(ScopeRejection::NonContent);
        }

        if let Some(pattern) = &self.url_pattern {
            if !is_seed && !url.path().contains(pattern.as_str()) {
                return Err(ScopeRejection::PatternMismatch);
            }
        }

        Ok(())
    }
}

/// Returns true for login/search/admin-style paths and media downloads
///
/// Segments are compared without their extension, so `/login.php` and
/// `/search.html` count as well as `/login`.
pub fn is_non_content_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();

    if lower.split('/').any(|segment| {
        let stem = segment.split('.').next().unwrap_or_default();
        NON_CONTENT_SEGMENTS.contains(&segment) || NON_CONTENT_SEGMENTS.contains(&stem)
    }) {
        return true;
    }

    let last = lower.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => NON_CONTENT_EXTENSIONS.contains(&ext),
        _ => false,
    }
}
