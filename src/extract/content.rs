//! Boilerplate removal and main-content selection

use crate::extract::clean::clean;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Elements removed from the whole document before content selection
const STRIPPED_ELEMENTS: &str = "nav, header, footer, aside, script, style, noscript, template";

/// Semantic containers, tried in order
const SEMANTIC_CONTAINERS: &[&str] = &["main", "article", "[role='main']"];

/// Conventional content containers, tried in order
const CONTENT_CONTAINERS: &[&str] = &[
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    ".article-body",
    ".post-body",
    "#content",
    "#main",
];

/// Block-level elements considered by the scoring fallback
const SCORED_CANDIDATES: &str = "div, section, td, blockquote, pre, p";

/// Interactive or linking elements that signal navigation-heavy markup
const PENALIZED_ELEMENTS: &str = "a, button, form, input, select, iframe";

/// Score deducted per penalized element
const ELEMENT_PENALTY: i64 = 10;

/// Elements that start and end a line of visible text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "td", "th", "tr", "ul",
];

/// Elements whose content is never visible text
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements never removed by the class/id rules
const PROTECTED_ELEMENTS: &[&str] = &["html", "body"];

/// Advertising class/id tokens: `ad`, `ads-top`, `sidebar-ad`, `sponsored`, ...
static AD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:ads?|advert|advertisement|advertising|sponsor|sponsored|promo|banner)(?:[-_].*)?$|[-_](?:ads?|advert|advertisement|sponsored)$",
    )
    .expect("ad token regex should compile")
});

/// Layout class/id tokens for sidebars, menus, sharing widgets and comments
static LAYOUT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:sidebar|side-bar|navigation|menu|main-menu|nav-menu|header|footer|breadcrumbs?|social-share|share-buttons|comments?|comment-section|comments-area|related-posts|newsletter|cookie-banner|cookie-notice)$",
    )
    .expect("layout token regex should compile")
});

/// Removes navigation, chrome, scripts and ad blocks from the document
pub fn strip_boilerplate(document: &mut Html) {
    let mut doomed = Vec::new();

    if let Ok(selector) = Selector::parse(STRIPPED_ELEMENTS) {
        doomed.extend(document.select(&selector).map(|element| element.id()));
    }

    if let Ok(selector) = Selector::parse("[class], [id]") {
        doomed.extend(
            document
                .select(&selector)
                .filter(|element| is_boilerplate_container(element))
                .map(|element| element.id()),
        );
    }

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_boilerplate_container(element: &ElementRef) -> bool {
    let value = element.value();
    if PROTECTED_ELEMENTS.contains(&value.name()) {
        return false;
    }

    value
        .classes()
        .chain(value.id())
        .any(|token| AD_TOKEN.is_match(token) || LAYOUT_TOKEN.is_match(token))
}

/// Chooses the element holding the page's primary content
///
/// # Selection Order
///
/// 1. First `<main>`, else `<article>`, else `role="main"` element
/// 2. First element of the conventional content class/id list
/// 3. Highest-[`score`] block candidate above zero, earliest wins ties
/// 4. `<body>`, or the root element for documents without one
pub fn select_main_content(document: &Html) -> ElementRef<'_> {
    SEMANTIC_CONTAINERS
        .iter()
        .chain(CONTENT_CONTAINERS)
        .find_map(|css| first_match(document, css))
        .or_else(|| best_scored_candidate(document))
        .or_else(|| first_match(document, "body"))
        .unwrap_or_else(|| document.root_element())
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn best_scored_candidate(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(SCORED_CANDIDATES).ok()?;

    let mut best: Option<(i64, ElementRef<'_>)> = None;
    for candidate in document.select(&selector) {
        let candidate_score = score(candidate);
        if candidate_score > best.map_or(0, |(s, _)| s) {
            best = Some((candidate_score, candidate));
        }
    }

    best.map(|(_, element)| element)
}

/// Content score of a container
///
/// Cleaned visible text length in characters, minus a fixed penalty for
/// every link, button, form control and iframe inside it.
pub fn score(container: ElementRef) -> i64 {
    let text_len = clean(&visible_text(container)).chars().count() as i64;
    let penalized = Selector::parse(PENALIZED_ELEMENTS)
        .map(|selector| container.select(&selector).count() as i64)
        .unwrap_or(0);

    text_len - ELEMENT_PENALTY * penalized
}

/// Visible text of an element
///
/// Block elements are separated by newlines; inline text is joined as
/// rendered. Whitespace inside `<pre>` is kept.
pub fn visible_text(element: ElementRef) -> String {
    let mut text = String::new();
    collect_text(element, false, &mut text);
    text
}

fn collect_text(element: ElementRef, preformatted: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if preformatted {
                    out.push_str(text);
                } else {
                    out.push_str(&text.replace('\n', " "));
                }
            }
            Node::Element(child_element) => {
                let name = child_element.name();
                if INVISIBLE_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_ref, preformatted || name == "pre", out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
