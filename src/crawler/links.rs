//! Link extraction from fetched pages
//!
//! Hyperlink targets are resolved against the page URL (or its `<base href>`)
//! and normalized. Links that cannot be crawled are dropped here.

use crate::url::{normalize, NormalizedUrl};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Extracts the distinct, normalized link targets of a page in document order
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not normalize to an http(s) URL
///
/// # Example
///
/// ```
/// use glean::crawler::extract_links;
/// use glean::url::normalize;
///
/// let page = normalize("https://example.com/docs/", None).unwrap();
/// let links = extract_links(r#"<a href="intro">Intro</a>"#, &page);
/// assert_eq!(links[0].as_str(), "https://example.com/docs/intro");
/// ```
pub fn extract_links(html: &str, page_url: &NormalizedUrl) -> Vec<NormalizedUrl> {
    let document = Html::parse_document(html);
    let base = base_url(&document, page_url);

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };
        if !is_followable(href) {
            continue;
        }

        match normalize(href, Some(&base)) {
            Ok(link) => {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
            Err(e) => tracing::debug!("Dropping link {:?} on {}: {}", href, page_url, e),
        }
    }

    links
}

/// The URL relative links resolve against
///
/// A `<base href>` wins over the page URL when it resolves to something valid.
fn base_url(document: &Html, page_url: &NormalizedUrl) -> Url {
    let page = page_url.as_url().clone();

    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page.join(href.trim()).ok())
        })
        .unwrap_or(page)
}

fn is_followable(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}
