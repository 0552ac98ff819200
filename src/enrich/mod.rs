//! Document enrichment
//!
//! Derives metadata from an extracted document: counts, a language guess, a
//! coarse content type, reading time and a code-heaviness signal.

mod heuristics;

pub use heuristics::{detect_content_type, detect_language, estimate_reading_time, is_mostly_code};

use crate::extract::ExtractedDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// An extracted document plus derived metadata, as written to JSONL output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDocument {
    pub url: String,
    pub title: String,
    pub body_text: String,
    pub depth: u32,
    pub char_count: usize,
    pub word_count: usize,
    pub language: String,
    pub content_type: String,
    pub fetched_at: DateTime<Utc>,
    pub reading_time_minutes: u32,
    pub is_mostly_code: bool,
    /// `host[:port]` of the source URL
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub unparsable: bool,
}

/// Enriches an extracted document
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use glean::enrich::enrich;
/// use glean::extract;
/// use glean::url::normalize;
///
/// let url = normalize("https://example.com/blog/hello", None).unwrap();
/// let doc = extract("<title>Hello</title><p>Hi there</p>").located(&url, 1);
/// let enriched = enrich(&doc, Utc::now());
/// assert_eq!(enriched.content_type, "article");
/// assert_eq!(enriched.word_count, 2);
/// ```
pub fn enrich(document: &ExtractedDocument, fetched_at: DateTime<Utc>) -> EnrichedDocument {
    let body = &document.body_text;
    let word_count = body.split_whitespace().count();
    let (domain, path) = domain_and_path(&document.source_url);

    EnrichedDocument {
        url: document.source_url.clone(),
        title: document.title.clone(),
        body_text: body.clone(),
        depth: document.depth,
        char_count: body.chars().count(),
        word_count,
        language: detect_language(body).to_string(),
        content_type: detect_content_type(&document.source_url, &document.title).to_string(),
        fetched_at,
        reading_time_minutes: estimate_reading_time(word_count),
        is_mostly_code: is_mostly_code(body),
        domain,
        path,
        unparsable: document.unparsable,
    }
}

fn domain_and_path(url: &str) -> (String, String) {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            let domain = match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            (domain, parsed.path().to_string())
        }
        Err(_) => (String::new(), String::new()),
    }
}
