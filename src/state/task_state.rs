//! Task state definitions for tracking crawl progress
//!
//! Every dequeued task moves `Queued -> Fetching` and then to exactly one
//! terminal state.

use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is waiting in the frontier
    Queued,

    /// Task has been dequeued and is being processed
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched and its content extracted
    Extracted,

    // ===== Terminal Skip States =====
    /// Task no longer passes the scope rules
    SkippedScope,

    /// robots.txt disallows the URL
    SkippedRobots,

    /// The response was not an HTML document
    SkippedContent,

    // ===== Terminal Error States =====
    /// Fetch failed after retries, or with a non-retryable status
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if this represents a skip state
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::SkippedScope | Self::SkippedRobots | Self::SkippedContent
        )
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Checks whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        match self {
            Self::Queued => next == Self::Fetching,
            Self::Fetching => next.is_terminal(),
            _ => false,
        }
    }

    /// Snake-case name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::SkippedScope => "skipped_scope",
            Self::SkippedRobots => "skipped_robots",
            Self::SkippedContent => "skipped_content",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::Fetching,
            Self::Extracted,
            Self::SkippedScope,
            Self::SkippedRobots,
            Self::SkippedContent,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
