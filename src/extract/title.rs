//! Title cascade

use crate::extract::clean::collapse_whitespace;
use scraper::{Html, Selector};

/// Title used when no source yields any text
pub const UNTITLED: &str = "Untitled";

/// Picks the page title, first non-empty source wins
///
/// `<title>` → first `<h1>` → `og:title` → `twitter:title` → `"Untitled"`.
pub fn extract_title(document: &Html) -> String {
    element_text(document, "title")
        .or_else(|| element_text(document, "h1"))
        .or_else(|| meta_content(document, "meta[property='og:title']"))
        .or_else(|| {
            meta_content(
                document,
                "meta[name='twitter:title'], meta[property='twitter:title']",
            )
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn element_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|text| !text.is_empty())
}
