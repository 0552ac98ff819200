//! Crawl statistics
//!
//! Statistics are accumulated from the crawl's event sequence and printed as
//! a summary when the run ends.

use crate::crawler::{CrawlEvent, SkipReason};
use crate::state::TaskState;
use crate::url::ScopeRejection;
use std::collections::{BTreeMap, HashMap};

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Count of finished tasks by terminal state
    pub tasks_by_state: HashMap<TaskState, u64>,

    /// Emitted documents per crawl depth
    pub documents_by_depth: BTreeMap<u32, u64>,

    /// Skipped tasks by reason
    pub skipped_by_reason: BTreeMap<String, u64>,

    /// Discovered links kept out of the frontier, by rule
    pub rejected_links: HashMap<ScopeRejection, u64>,

    /// Failed URLs and their errors, in crawl order
    pub failures: Vec<(String, String)>,

    /// Documents whose HTML could not be parsed
    pub unparsable_documents: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one crawl event
    pub fn record(&mut self, event: &CrawlEvent) {
        *self.tasks_by_state.entry(event.state()).or_insert(0) += 1;

        match event {
            CrawlEvent::Document(doc) => {
                *self.documents_by_depth.entry(doc.depth).or_insert(0) += 1;
                if doc.unparsable {
                    self.unparsable_documents += 1;
                }
            }
            CrawlEvent::Skipped(skip) => {
                *self
                    .skipped_by_reason
                    .entry(skip_category(&skip.reason))
                    .or_insert(0) += 1;
            }
            CrawlEvent::Failed(fail) => {
                self.failures
                    .push((fail.url.clone(), fail.error.to_string()));
            }
        }
    }

    /// Records a discovered link that failed the scope rules
    pub fn record_rejection(&mut self, rejection: ScopeRejection) {
        *self.rejected_links.entry(rejection).or_insert(0) += 1;
    }

    /// Number of tasks that reached `state`
    pub fn count(&self, state: TaskState) -> u64 {
        self.tasks_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn documents(&self) -> u64 {
        self.count(TaskState::Extracted)
    }

    pub fn total_tasks(&self) -> u64 {
        self.tasks_by_state.values().sum()
    }

    /// Share of finished tasks that produced a document, in percent
    pub fn success_rate(&self) -> f64 {
        let total = self.total_tasks();
        if total == 0 {
            0.0
        } else {
            (self.documents() as f64 / total as f64) * 100.0
        }
    }
}

fn skip_category(reason: &SkipReason) -> String {
    match reason {
        SkipReason::Robots => "robots.txt".to_string(),
        SkipReason::Scope(rejection) => format!("scope: {}", rejection),
        SkipReason::Content(_) => "non-html content".to_string(),
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Tasks processed: {}", stats.total_tasks());
    println!("  Documents extracted: {}", stats.documents());
    if stats.unparsable_documents > 0 {
        println!("  Unparsable documents: {}", stats.unparsable_documents);
    }
    println!();

    println!("Tasks by State:");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.tasks_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (state, count) in state_counts {
        println!("  {}: {}", state, count);
    }
    println!();

    if !stats.documents_by_depth.is_empty() {
        println!("Documents by Depth:");
        for (depth, count) in &stats.documents_by_depth {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if !stats.skipped_by_reason.is_empty() {
        println!("Skipped:");
        for (reason, count) in &stats.skipped_by_reason {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    if !stats.rejected_links.is_empty() {
        println!("Links Out of Scope:");
        let mut rejections: Vec<_> = stats.rejected_links.iter().collect();
        rejections.sort_by(|a, b| b.1.cmp(a.1));
        for (rejection, count) in rejections {
            println!("  {}: {}", rejection, count);
        }
        println!();
    }

    if !stats.failures.is_empty() {
        println!("Failures ({}):", stats.failures.len());
        for (url, error) in &stats.failures {
            println!("  - {}: {}", url, error);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} tasks produced a document)",
        stats.success_rate(),
        stats.documents(),
        stats.total_tasks()
    );
}
