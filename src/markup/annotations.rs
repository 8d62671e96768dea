//! Inline tag and sentinel link annotations on the first line.

use super::first_line::{FirstLine, join_lines, split_first_line};
use super::{LINK_SENTINEL, TASK_TAG};

/// Returns `true` when `tag` occurs anywhere in `content`.
#[must_use]
pub fn has_tag(content: &str, tag: &str) -> bool {
    content.contains(tag)
}

/// Returns `true` when `content` already carries a sentinel link.
#[must_use]
pub fn has_task_link(content: &str) -> bool {
    content.contains(LINK_SENTINEL)
}

/// Formats the sentinel link for a remote task URL.
#[must_use]
pub fn task_link(url: &str) -> String {
    format!("{LINK_SENTINEL}({url})")
}

/// Appends `tag` to the first line, ahead of a trailing attribute block.
///
/// Does nothing when the tag already appears anywhere in the content.
#[must_use]
pub fn add_tag_to_first_line(content: &str, tag: &str) -> String {
    if has_tag(content, tag) {
        return content.to_owned();
    }
    append_to_first_line(content, tag)
}

/// Adds the sentinel link pointing at `url`.
///
/// The link goes directly after the task tag when there is one, otherwise to
/// the end of the first line ahead of a trailing attribute block. Does
/// nothing when a sentinel link is already present.
#[must_use]
pub fn add_task_link(content: &str, url: &str) -> String {
    if has_task_link(content) {
        return content.to_owned();
    }

    let link = task_link(url);
    content.find(TASK_TAG).map_or_else(
        || append_to_first_line(content, &link),
        |tag_start| {
            let (head, rest) = content.split_at(tag_start + TASK_TAG.len());
            format!("{head} {link}{rest}")
        },
    )
}

fn append_to_first_line(content: &str, token: &str) -> String {
    let (first, rest) = split_first_line(content);
    let edited = FirstLine::parse(first).with_appended(token);
    join_lines(&edited, rest)
}
