//! Plain task title extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::first_line::split_first_line;

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is exercised by unit tests"
)]
static TASK_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[*-]\s+)?(?:\{:.*?\}\s*)?\[[ xX]\]\s*").expect("valid task prefix regex")
});

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is exercised by unit tests"
)]
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[*-]\s+").expect("valid list marker regex"));

#[expect(
    clippy::expect_used,
    reason = "the patterns are literals and are exercised by unit tests"
)]
static ANNOTATIONS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\{:.*?\}").expect("valid attribute-block regex"),
        Regex::new(r"#\w+#").expect("valid tag regex"),
        Regex::new(r"\[.*?\]\(.*?\)").expect("valid link regex"),
    ]
});

/// Extracts the remote task title from block content.
///
/// Only the first line contributes. Everything up to and including the
/// first-line checkbox is stripped, or just the list marker when there is no
/// checkbox. This prefix rule is looser than [`super::is_task_block`]: a
/// checkbox glued to its text (`[ ]text`) or an attribute block without a
/// list marker still counts. Every attribute block, `#tag#` and markdown
/// link is then removed and the result trimmed.
#[must_use]
pub fn extract_task_content(content: &str) -> String {
    let (first, _) = split_first_line(content);
    let text = TASK_PREFIX
        .find(first)
        .or_else(|| LIST_MARKER.find(first))
        .and_then(|prefix| first.get(prefix.end()..))
        .unwrap_or(first);

    let stripped = ANNOTATIONS
        .iter()
        .fold(text.to_owned(), |acc, pattern| {
            pattern.replace_all(&acc, "").into_owned()
        });
    stripped.trim().to_owned()
}
