//! URL handling module for Glean
//!
//! This module provides URL normalization and the scope rules that decide
//! which discovered links are crawled.

mod normalize;
mod scope;

pub use normalize::{normalize, NormalizedUrl};
pub use scope::{is_non_content_path, ScopeFilter, ScopeRejection};
