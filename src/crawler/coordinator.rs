//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop that coordinates:
//! - The frontier queue and visited set
//! - Scope and robots.txt checks
//! - Politeness waits between requests to the same host
//! - Fetching, extraction and link following
//!
//! The loop is pull-driven: each call to [`Crawler::next_event`] processes
//! exactly one dequeued task and reports what happened to it.

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::{
    build_http_client, extract_links, CrawlTask, FetchError, FetchOutcome, Fetcher, Frontier,
    RetryPolicy, VisitedSet,
};
use crate::extract::{extract, ExtractedDocument};
use crate::output::CrawlStatistics;
use crate::robots::RobotsPolicy;
use crate::state::{effective_delay, DomainState, TaskState};
use crate::url::{normalize, NormalizedUrl, ScopeFilter, ScopeRejection};
use crate::{GleanError, Result};
use futures::stream::{self, Stream};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Why a dequeued task produced no document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// robots.txt disallows the URL
    Robots,
    /// The task no longer passes the scope rules
    Scope(ScopeRejection),
    /// The response was not HTML
    Content(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Robots => f.write_str("disallowed by robots.txt"),
            Self::Scope(rejection) => write!(f, "out of scope: {}", rejection),
            Self::Content(reason) => f.write_str(reason),
        }
    }
}

/// A task that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEvent {
    pub url: String,
    pub depth: u32,
    pub reason: SkipReason,
}

/// A task whose fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailEvent {
    pub url: String,
    pub depth: u32,
    pub error: FetchError,
    pub attempts: u32,
}

/// What happened to one dequeued task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Document(ExtractedDocument),
    Skipped(SkipEvent),
    Failed(FailEvent),
}

impl CrawlEvent {
    /// The URL of the task this event reports on
    pub fn url(&self) -> &str {
        match self {
            Self::Document(doc) => &doc.source_url,
            Self::Skipped(skip) => &skip.url,
            Self::Failed(fail) => &fail.url,
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            Self::Document(doc) => doc.depth,
            Self::Skipped(skip) => skip.depth,
            Self::Failed(fail) => fail.depth,
        }
    }

    /// The terminal state the task ended in
    pub fn state(&self) -> TaskState {
        match self {
            Self::Document(_) => TaskState::Extracted,
            Self::Skipped(SkipEvent {
                reason: SkipReason::Robots,
                ..
            }) => TaskState::SkippedRobots,
            Self::Skipped(SkipEvent {
                reason: SkipReason::Scope(_),
                ..
            }) => TaskState::SkippedScope,
            Self::Skipped(SkipEvent {
                reason: SkipReason::Content(_),
                ..
            }) => TaskState::SkippedContent,
            Self::Failed(_) => TaskState::Failed,
        }
    }

    pub fn as_document(&self) -> Option<&ExtractedDocument> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

/// A single crawl run
///
/// Owns the frontier, the visited set and all per-host state, so independent
/// runs never share anything.
pub struct Crawler {
    config: CrawlerConfig,
    seed: NormalizedUrl,
    scope: ScopeFilter,
    frontier: Frontier,
    robots: RobotsPolicy,
    fetcher: Fetcher,
    domains: HashMap<String, DomainState>,
    stats: CrawlStatistics,
    fetched: usize,
    started: Instant,
    finished: bool,
}

impl Crawler {
    /// Creates a crawler for `seed` using the configured retry policy
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, an invalid seed URL, or if the HTTP
    /// client cannot be built.
    pub fn new(seed: &str, config: &Config) -> Result<Self> {
        Self::with_retry_policy(seed, config, RetryPolicy::from_config(&config.retry))
    }

    /// Creates a crawler whose fetcher uses `retry` instead of the configured policy
    pub fn with_retry_policy(seed: &str, config: &Config, retry: RetryPolicy) -> Result<Self> {
        validate(config)?;
        let seed = normalize(seed, None)?;

        let client = build_http_client(&config.user_agent)?;
        let timeout = config.crawler.timeout();
        let robots = RobotsPolicy::new(
            client.clone(),
            &config.user_agent.crawler_name,
            timeout,
            config.crawler.respect_robots,
        );
        let fetcher = Fetcher::new(client, retry, timeout);

        Ok(Self {
            config: config.crawler.clone(),
            scope: ScopeFilter::new(&seed, &config.crawler),
            frontier: Frontier::new(seed.clone()),
            seed,
            robots,
            fetcher,
            domains: HashMap::new(),
            stats: CrawlStatistics::new(),
            fetched: 0,
            started: Instant::now(),
            finished: false,
        })
    }

    /// Processes the next task and reports its outcome
    ///
    /// Returns `None` once the frontier is empty or the page limit is
    /// reached. A fatal error is returned once and ends the run.
    pub async fn next_event(&mut self) -> Option<Result<CrawlEvent>> {
        if self.finished {
            return None;
        }

        if self.fetched == 0 && self.frontier.visited().is_empty() {
            tracing::info!(
                "Starting crawl of {} (max {} pages, max depth {})",
                self.seed,
                self.config.max_pages,
                self.config.max_depth
            );
        }

        if self.fetched >= self.config.max_pages {
            self.finish("page limit reached");
            return None;
        }

        let Some(task) = self.frontier.next_task() else {
            self.finish("frontier is empty");
            return None;
        };

        let result = self.process(task).await;
        match &result {
            Ok(event) => self.stats.record(event),
            Err(e) => {
                tracing::error!("Crawl aborted: {}", e);
                self.finished = true;
            }
        }

        Some(result)
    }

    /// Turns the crawler into a lazy stream of events
    pub fn into_stream(self) -> impl Stream<Item = Result<CrawlEvent>> {
        stream::unfold(self, |mut crawler| async move {
            let event = crawler.next_event().await?;
            Some((event, crawler))
        })
    }

    pub fn seed(&self) -> &NormalizedUrl {
        &self.seed
    }

    /// Number of tasks still queued
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited(&self) -> &VisitedSet {
        self.frontier.visited()
    }

    /// Number of documents emitted so far
    pub fn fetched_count(&self) -> usize {
        self.fetched
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    async fn process(&mut self, task: CrawlTask) -> Result<CrawlEvent> {
        let mut state = TaskState::Queued;
        advance(&mut state, TaskState::Fetching)?;

        let url = task.url().clone();
        let depth = task.depth();
        tracing::debug!("Processing {} (depth {})", url, depth);

        if let Err(rejection) = self.scope.check_task(&url, depth) {
            advance(&mut state, TaskState::SkippedScope)?;
            tracing::info!("Skipping {}: {}", url, rejection);
            return Ok(skipped(&task, SkipReason::Scope(rejection)));
        }

        if !self.robots.allowed(&url).await {
            advance(&mut state, TaskState::SkippedRobots)?;
            tracing::info!("Skipping {}: disallowed by robots.txt", url);
            return Ok(skipped(&task, SkipReason::Robots));
        }

        self.wait_politely(&url).await;

        match self.fetcher.fetch(&url).await {
            FetchOutcome::Ok {
                html,
                status_code,
                final_url,
                attempts,
            } => {
                tracing::debug!(
                    "Fetched {} (HTTP {}, {} attempt(s), {} bytes)",
                    final_url,
                    status_code,
                    attempts,
                    html.len()
                );

                if final_url != url {
                    if let Err(rejection) = self.admit_redirect(&final_url, &task) {
                        advance(&mut state, TaskState::SkippedScope)?;
                        tracing::info!(
                            "Skipping {}: redirected to {} ({})",
                            url,
                            final_url,
                            rejection
                        );
                        return Ok(skipped(&task, SkipReason::Scope(rejection)));
                    }
                }

                let document = extract(&html).located(&final_url, depth);
                if document.unparsable {
                    tracing::warn!("Could not parse content of {}", final_url);
                }
                self.fetched += 1;
                self.enqueue_links(&html, &final_url, depth);

                advance(&mut state, TaskState::Extracted)?;
                tracing::info!(
                    "[{}/{}] {} (depth {}, {} chars)",
                    self.fetched,
                    self.config.max_pages,
                    url,
                    depth,
                    document.body_text.chars().count()
                );
                Ok(CrawlEvent::Document(document))
            }
            FetchOutcome::Skipped { reason } => {
                advance(&mut state, TaskState::SkippedContent)?;
                tracing::info!("Skipping {}: {}", url, reason);
                Ok(skipped(&task, SkipReason::Content(reason)))
            }
            FetchOutcome::Failed { error, attempts } => {
                advance(&mut state, TaskState::Failed)?;
                if task.is_seed() {
                    return Err(GleanError::SeedUnreachable {
                        url: url.to_string(),
                        reason: error.to_string(),
                    });
                }

                tracing::warn!(
                    "Failed to fetch {} after {} attempt(s): {}",
                    url,
                    attempts,
                    error
                );
                Ok(CrawlEvent::Failed(FailEvent {
                    url: url.to_string(),
                    depth,
                    error,
                    attempts,
                }))
            }
        }
    }

    /// Checks where a redirect landed and commits it to the visited set
    ///
    /// A redirected seed moves the crawl scope to its final location, so an
    /// `http` seed that lands on `https` keeps crawling the same site.
    fn admit_redirect(
        &mut self,
        final_url: &NormalizedUrl,
        task: &CrawlTask,
    ) -> std::result::Result<(), ScopeRejection> {
        if task.is_seed() {
            tracing::info!("Seed redirected; crawl scope is now {}", final_url.origin());
            self.scope = ScopeFilter::new(final_url, &self.config);
        }

        self.scope.check_task(final_url, task.depth())?;
        if !self.frontier.mark_visited(final_url) {
            return Err(ScopeRejection::AlreadyVisited);
        }
        Ok(())
    }

    /// Sleeps until the politeness delay since the last request to this host has passed
    async fn wait_politely(&mut self, url: &NormalizedUrl) {
        let crawl_delay = self.robots.crawl_delay(url).await;
        let delay = effective_delay(self.config.delay(), crawl_delay);

        let domain = self.domains.entry(url.origin()).or_default();
        let wait = domain.time_until_next_request(delay, Instant::now());
        if !wait.is_zero() {
            tracing::debug!("Waiting {:?} before requesting {}", wait, url);
            tokio::time::sleep(wait).await;
        }
        domain.record_request(Instant::now());
    }

    /// Queues every in-scope link of a fetched page one level deeper
    ///
    /// `page_url` is where the page was served from, after redirects.
    fn enqueue_links(&mut self, html: &str, page_url: &NormalizedUrl, depth: u32) {
        let child_depth = depth + 1;
        if child_depth > self.config.max_depth {
            return;
        }

        let mut queued = 0;
        for link in extract_links(html, page_url) {
            match self.scope.verdict(&link, child_depth, self.frontier.visited()) {
                Ok(()) => {
                    if self.frontier.push(link, child_depth) {
                        queued += 1;
                    }
                }
                Err(rejection) => {
                    tracing::trace!("Not following {}: {}", link, rejection);
                    self.stats.record_rejection(rejection);
                }
            }
        }

        tracing::debug!(
            "Queued {} new link(s) from {} ({} in frontier)",
            queued,
            page_url,
            self.frontier.len()
        );
    }

    fn finish(&mut self, reason: &str) {
        self.finished = true;
        tracing::info!(
            "Crawl complete ({}): {} documents, {} URLs visited, {} still queued, {:.1}s",
            reason,
            self.fetched,
            self.frontier.visited().len(),
            self.frontier.len(),
            self.started.elapsed().as_secs_f64()
        );
    }
}

/// Starts a crawl and returns its lazy event stream
///
/// Setup faults (invalid configuration or seed) are returned before the
/// stream starts; a fatal seed failure is the stream's last item.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use glean::{crawl, Config, CrawlEvent};
///
/// # async fn run() -> glean::Result<()> {
/// let mut events = Box::pin(crawl("https://example.com/", &Config::default())?);
/// while let Some(event) = events.next().await {
///     if let CrawlEvent::Document(doc) = event? {
///         println!("{}: {}", doc.source_url, doc.title);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn crawl(seed: &str, config: &Config) -> Result<impl Stream<Item = Result<CrawlEvent>>> {
    Ok(Crawler::new(seed, config)?.into_stream())
}

fn advance(state: &mut TaskState, next: TaskState) -> Result<()> {
    if !state.can_transition_to(next) {
        return Err(GleanError::InvalidTransition {
            from: *state,
            to: next,
        });
    }
    *state = next;
    Ok(())
}

fn skipped(task: &CrawlTask, reason: SkipReason) -> CrawlEvent {
    CrawlEvent::Skipped(SkipEvent {
        url: task.url().to_string(),
        depth: task.depth(),
        reason,
    })
}
