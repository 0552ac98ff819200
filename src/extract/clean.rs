//! Text normalization for extracted content

use regex::Regex;
use std::sync::LazyLock;

/// Runs of whitespace other than newlines
static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("inline whitespace regex should compile"));

/// Three or more consecutive newlines
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line regex should compile"));

/// Normalizes extracted text
///
/// Whitespace runs within a line collapse to one space, every line is
/// trimmed, three or more newlines become one paragraph break (`\n\n`), and
/// the ends are trimmed. The result is a fixed point:
/// `clean(&clean(x)) == clean(x)`.
pub fn clean(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| INLINE_WHITESPACE.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");

    BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// Collapses all whitespace, newlines included, to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
