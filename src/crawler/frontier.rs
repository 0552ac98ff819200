//! Breadth-first crawl frontier and visited set
//!
//! The frontier is a FIFO queue, so tasks are processed in non-decreasing
//! depth order. A URL is never queued twice and never queued once visited.

use crate::url::NormalizedUrl;
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be crawled, with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    url: NormalizedUrl,
    depth: u32,
}

impl CrawlTask {
    pub fn new(url: NormalizedUrl, depth: u32) -> Self {
        Self { url, depth }
    }

    pub fn url(&self) -> &NormalizedUrl {
        &self.url
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether this task is the crawl's entry point
    pub fn is_seed(&self) -> bool {
        self.depth == 0
    }
}

/// URLs whose fetch has begun in this run
///
/// Only grows. A URL is committed when its task is dequeued, before any
/// network I/O.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<NormalizedUrl>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.urls.contains(url)
    }

    /// Marks a URL visited; returns false if it already was
    pub fn commit(&mut self, url: &NormalizedUrl) -> bool {
        self.urls.insert(url.clone())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.urls.iter()
    }
}

/// FIFO queue of crawl tasks plus the visited set it feeds
#[derive(Debug, Clone)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    /// URLs currently in `queue`
    pending: HashSet<NormalizedUrl>,
    visited: VisitedSet,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn new(seed: NormalizedUrl) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            pending: HashSet::new(),
            visited: VisitedSet::new(),
        };
        frontier.push(seed, 0);
        frontier
    }

    /// Dequeues the next task and commits its URL to the visited set
    ///
    /// Queued URLs that were visited in the meantime (as a redirect target)
    /// are dropped.
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.queue.pop_front() {
            self.pending.remove(task.url());
            if self.visited.commit(task.url()) {
                return Some(task);
            }
            tracing::debug!("Dropping {}: already reached through a redirect", task.url());
        }
        None
    }

    /// Commits a URL reached without being dequeued, such as a redirect target
    ///
    /// Returns false if it was already visited.
    pub fn mark_visited(&mut self, url: &NormalizedUrl) -> bool {
        self.visited.commit(url)
    }

    /// Enqueues a URL unless it is already queued or visited
    ///
    /// Returns true if a task was added.
    pub fn push(&mut self, url: NormalizedUrl, depth: u32) -> bool {
        if self.visited.contains(&url) || self.pending.contains(&url) {
            return false;
        }

        self.pending.insert(url.clone());
        self.queue.push_back(CrawlTask::new(url, depth));
        true
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }
}
