//! Removal of the editor's slash-command trigger text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::first_line::{join_lines, split_first_line};

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is exercised by unit tests"
)]
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("valid whitespace-run regex"));

/// Removes the `/keyword` text typed to open the slash menu.
///
/// The user may pick the menu entry after typing only part of a keyword, so
/// `/<partial>` qualifies when `<partial>` is a case-insensitive prefix of a
/// configured keyword. A trailing `/<partial>` on the first line is preferred
/// (an empty partial also qualifies there); failing that, the first
/// `/<word>` elsewhere on the first line is tried. After removal, whitespace
/// runs collapse to one space and the line is trimmed. Content without a
/// qualifying trigger is returned unchanged.
#[must_use]
pub fn remove_slash_trigger(content: &str, keywords: &[impl AsRef<str>]) -> String {
    let (first, rest) = split_first_line(content);
    let Some(trigger) = find_trigger(first, keywords) else {
        return content.to_owned();
    };

    let head = first.get(..trigger.start).unwrap_or_default();
    let after = first.get(trigger.end..).unwrap_or_default();
    let joined = format!("{head}{after}");
    let collapsed = WHITESPACE_RUN.replace_all(&joined, " ");
    join_lines(collapsed.trim(), rest)
}

fn find_trigger(line: &str, keywords: &[impl AsRef<str>]) -> Option<Range<usize>> {
    if let Some(slash) = line.rfind('/') {
        let typed = line.get(slash + 1..).unwrap_or_default();
        if typed.chars().all(is_word_char) {
            let qualifies = typed.is_empty() || is_keyword_prefix(typed, keywords);
            return qualifies.then_some(slash..line.len());
        }
    }

    let (slash, typed) = line.match_indices('/').find_map(|(slash, _)| {
        let after = line.get(slash + 1..)?;
        let word_len: usize = after
            .chars()
            .take_while(|character| is_word_char(*character))
            .map(char::len_utf8)
            .sum();
        let word = after.get(..word_len).filter(|word| !word.is_empty())?;
        Some((slash, word))
    })?;

    is_keyword_prefix(typed, keywords).then_some(slash..slash + 1 + typed.len())
}

fn is_keyword_prefix(typed: &str, keywords: &[impl AsRef<str>]) -> bool {
    let typed = typed.to_lowercase();
    keywords
        .iter()
        .any(|keyword| keyword.as_ref().to_lowercase().starts_with(&typed))
}

fn is_word_char(character: char) -> bool {
    character.is_alphanumeric() || character == '_'
}
