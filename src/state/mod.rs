//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: The lifecycle of a single crawl task (queued, fetching, extracted, skipped, failed)
//! - `DomainState`: Per-host request timing used to enforce the politeness delay

mod domain_state;
mod task_state;

pub use domain_state::{effective_delay, DomainState};
pub use task_state::TaskState;
