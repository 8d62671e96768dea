//! Checkbox detection, conversion and completion marking.

use super::first_line::{CheckboxState, FirstLine, split_first_line};
use super::{COMPLETION_GLYPH, LINK_SENTINEL};

const UNCHECKED: &str = "[ ]";
const CHECKED: &str = "[x]";

/// Returns `true` when the first line of `content` starts a checkbox item.
///
/// Recognised shapes are `* [ ] text`, `- [ ] text`, an attribute block
/// between marker and checkbox (`* {: id="..."} [ ] text`) and a bare
/// `[ ] text` without list marker. Checkboxes on later lines do not count.
#[must_use]
pub fn is_task_block(content: &str) -> bool {
    checkbox_state(content).is_some()
}

/// Returns the state of the first-line checkbox, if there is one.
#[must_use]
pub fn checkbox_state(content: &str) -> Option<CheckboxState> {
    let (first, _) = split_first_line(content);
    FirstLine::parse(first).checkbox()
}

/// Turns a plain block into a one-item checkbox list.
///
/// Task blocks are returned unchanged. Otherwise `* [ ] ` is prepended to the
/// whole content.
#[must_use]
pub fn convert_to_task_block(content: &str) -> String {
    if is_task_block(content) {
        return content.to_owned();
    }
    format!("* {UNCHECKED} {content}")
}

/// Ticks the first `[ ]` in `content` and appends the completion glyph after
/// the sentinel link.
///
/// Only one checkbox is flipped. The glyph is not added twice.
#[must_use]
pub fn mark_task_complete(content: &str) -> String {
    let ticked = content.replacen(UNCHECKED, CHECKED, 1);

    let Some(link_end) = sentinel_link_end(&ticked) else {
        return ticked;
    };
    let (head, rest) = ticked.split_at(link_end);
    let glyph = format!(" {COMPLETION_GLYPH}");
    if rest.starts_with(&glyph) {
        return ticked;
    }
    format!("{head}{glyph}{rest}")
}

/// Returns the byte offset just past the first `[»link«](url)` token with a
/// non-empty url.
fn sentinel_link_end(content: &str) -> Option<usize> {
    let opening = format!("{LINK_SENTINEL}(");
    content.match_indices(&opening).find_map(|(start, _)| {
        let url_start = start + opening.len();
        let close = content.get(url_start..)?.find(')')?;
        (close > 0).then_some(url_start + close + 1)
    })
}
