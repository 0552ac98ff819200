//! Per-run robots.txt cache
//!
//! Entries are keyed by origin and never expire: a run fetches each
//! server's robots.txt at most once.

use crate::robots::RobotsRuleSet;
use std::collections::HashMap;

/// Where a cached rule set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsSource {
    /// robots.txt was fetched and parsed
    Fetched,
    /// The server answered 4xx: no rules apply
    Missing,
    /// Network failure or 5xx: fail-open, no rules apply
    Unavailable,
}

/// Cached robots.txt data for one origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: RobotsRuleSet,
    pub source: RobotsSource,
}

impl CachedRobots {
    pub fn new(rules: RobotsRuleSet, source: RobotsSource) -> Self {
        Self { rules, source }
    }

    /// Permissive entry for a server whose robots.txt could not be loaded
    pub fn unavailable() -> Self {
        Self::new(RobotsRuleSet::allow_all(), RobotsSource::Unavailable)
    }
}

/// Robots rule sets keyed by origin (`scheme://host[:port]`)
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, CachedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.entries.contains_key(origin)
    }

    pub fn get(&self, origin: &str) -> Option<&CachedRobots> {
        self.entries.get(origin)
    }

    /// Stores the rules for an origin; an existing entry is kept
    pub fn insert(&mut self, origin: String, robots: CachedRobots) {
        self.entries.entry(origin).or_insert(robots);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
