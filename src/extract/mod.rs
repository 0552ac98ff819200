//! Content extraction module
//!
//! Turns raw HTML into a title and cleaned primary-content text. Extraction
//! is pure: no I/O, and the same input always yields the same document.
//!
//! # Components
//!
//! - `title`: the title cascade
//! - `content`: boilerplate stripping, main-content selection and scoring
//! - `clean`: whitespace normalization

mod clean;
mod content;
mod title;

pub use clean::{clean, collapse_whitespace};
pub use content::{score, select_main_content, strip_boilerplate, visible_text};
pub use title::{extract_title, UNTITLED};

use crate::url::NormalizedUrl;
use scraper::Html;

/// Share of U+FFFD characters above which input is treated as undecodable
const MAX_REPLACEMENT_RATIO: f64 = 0.5;

/// Title and primary text of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub title: String,
    pub body_text: String,
    /// Empty until [`located`](Self::located) attaches provenance
    pub source_url: String,
    pub depth: u32,
    /// Input could not be parsed into any content; `body_text` is empty
    pub unparsable: bool,
}

impl ExtractedDocument {
    fn unparsable() -> Self {
        Self {
            title: UNTITLED.to_string(),
            body_text: String::new(),
            source_url: String::new(),
            depth: 0,
            unparsable: true,
        }
    }

    /// Attaches the page URL and crawl depth
    pub fn located(mut self, url: &NormalizedUrl, depth: u32) -> Self {
        self.source_url = url.as_str().to_string();
        self.depth = depth;
        self
    }
}

/// Extracts the title and main content of an HTML page
///
/// Never fails: input that cannot be parsed yields an empty-body document
/// with `unparsable` set.
///
/// # Example
///
/// ```
/// use glean::extract;
///
/// let doc = extract("<title>Hi</title><main><p>Hello,   world</p></main>");
/// assert_eq!(doc.title, "Hi");
/// assert_eq!(doc.body_text, "Hello, world");
/// ```
pub fn extract(html: &str) -> ExtractedDocument {
    if is_unparsable(html) {
        return ExtractedDocument::unparsable();
    }

    let mut document = Html::parse_document(html);
    let title = extract_title(&document);

    strip_boilerplate(&mut document);
    let body_text = clean(&visible_text(select_main_content(&document)));

    ExtractedDocument {
        title,
        body_text,
        source_url: String::new(),
        depth: 0,
        unparsable: false,
    }
}

/// Empty input, binary input, or text that failed to decode
fn is_unparsable(html: &str) -> bool {
    if html.trim().is_empty() || html.contains('\0') {
        return true;
    }

    let total = html.chars().count();
    let replaced = html.chars().filter(|c| *c == char::REPLACEMENT_CHARACTER).count();
    replaced as f64 / total as f64 > MAX_REPLACEMENT_RATIO
}
