//! Output module for persisting documents and reporting on a crawl
//!
//! This module handles:
//! - Writing enriched documents as JSON Lines
//! - Reading JSON Lines output back
//! - Recording crawl statistics

mod jsonl;
pub mod stats;

pub use jsonl::{read_jsonl, JsonlWriter};
pub use stats::{print_statistics, CrawlStatistics};

use crate::enrich::EnrichedDocument;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for enriched documents
pub trait DocumentSink {
    /// Persists one document
    fn write_document(&mut self, document: &EnrichedDocument) -> OutputResult<()>;

    /// Flushes buffered documents to the underlying storage
    fn flush(&mut self) -> OutputResult<()>;

    /// Number of documents written through this sink
    fn documents_written(&self) -> usize;
}
