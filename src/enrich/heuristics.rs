//! Lightweight text and URL heuristics used by enrichment

use regex::Regex;
use std::sync::LazyLock;

/// Texts shorter than this are not worth guessing a language for
const MIN_LANGUAGE_SAMPLE: usize = 50;

const DEFAULT_LANGUAGE: &str = "en";

/// Common short words per language, checked in this order; earlier wins ties
const LANGUAGE_STOP_WORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "is", "to", "of"]),
    ("es", &["el", "la", "de", "que", "y"]),
    ("fr", &["le", "la", "de", "et", "à"]),
    ("de", &["der", "die", "und", "in", "ist"]),
];

/// URL fragments per content type, checked in this order
const URL_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("article", &["/article/", "/post/", "/blog/", "/news/"]),
    ("doc_page", &["/docs/", "/documentation/", "/guide/", "/manual/"]),
    ("product_page", &["/product/", "/item/", "/shop/"]),
    ("tutorial", &["/tutorial/", "/how-to/", "/learn/"]),
    ("about", &["/about", "/contact", "/team"]),
];

/// Title keywords per content type, checked after the URL rules
const TITLE_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("tutorial", &["tutorial", "how to", "guide"]),
    ("article", &["blog", "post", "article"]),
    ("doc_page", &["documentation", "docs", "api"]),
];

const DEFAULT_CONTENT_TYPE: &str = "page";

const WORDS_PER_MINUTE: f64 = 200.0;

/// Matches below this count never make a text "mostly code"
const MIN_CODE_INDICATORS: usize = 3;

/// Characters of text one code indicator accounts for
const CHARS_PER_CODE_INDICATOR: usize = 100;

static STOP_WORD_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    LANGUAGE_STOP_WORDS
        .iter()
        .map(|(language, words)| {
            let patterns = words
                .iter()
                .map(|word| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(word)))
                        .expect("stop word regex should compile")
                })
                .collect();
            (*language, patterns)
        })
        .collect()
});

static CODE_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)function\s+\w+\s*\(",
        r"(?i)def\s+\w+\s*\(",
        r"(?i)class\s+\w+",
        r"(?i)import\s+\w+",
        r"(?i)#include",
        r"(?i)<\?php",
        r"(?i)console\.log",
        r"(?i)\.getElementById",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("code indicator regex should compile"))
    .collect()
});

/// Guesses the language of a text by counting common stop words
///
/// Returns `"en"` for short texts or when no stop word matches.
pub fn detect_language(text: &str) -> &'static str {
    if text.chars().count() < MIN_LANGUAGE_SAMPLE {
        return DEFAULT_LANGUAGE;
    }

    let lower = text.to_lowercase();
    let mut best = (DEFAULT_LANGUAGE, 0);
    for (language, patterns) in STOP_WORD_PATTERNS.iter() {
        let hits: usize = patterns.iter().map(|p| p.find_iter(&lower).count()).sum();
        if hits > best.1 {
            best = (*language, hits);
        }
    }

    best.0
}

/// Classifies a page from its URL path, then its title
pub fn detect_content_type(url: &str, title: &str) -> &'static str {
    let url = url.to_lowercase();
    let title = title.to_lowercase();

    URL_CONTENT_TYPES
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|f| url.contains(f)))
        .or_else(|| {
            TITLE_CONTENT_TYPES
                .iter()
                .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        })
        .map_or(DEFAULT_CONTENT_TYPE, |(content_type, _)| *content_type)
}

/// Reading time in whole minutes at 200 words per minute, at least 1
pub fn estimate_reading_time(word_count: usize) -> u32 {
    let minutes = (word_count as f64 / WORDS_PER_MINUTE).round_ties_even() as u32;
    minutes.max(1)
}

/// Whether a text is dominated by source code
///
/// Requires at least three code indicators, and at least one indicator per
/// hundred characters.
pub fn is_mostly_code(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let matches: usize = CODE_INDICATORS
        .iter()
        .map(|pattern| pattern.find_iter(text).count())
        .sum();

    matches >= MIN_CODE_INDICATORS && matches * CHARS_PER_CODE_INDICATOR > text.chars().count()
}
