//! Structured view of the first line of a kramdown block.
//!
//! A task line has the fixed left-to-right shape
//! `[list-marker] [attributes] [checkbox] body [trailing-attributes]`. The
//! parser records where each part ends so that edits can be applied to the
//! body without disturbing the prefix or the trailing attribute block.

/// Completion state of a checkbox marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckboxState {
    /// `[ ]`
    Unchecked,
    /// `[x]` (SiYuan also writes `[X]`).
    Checked,
}

impl CheckboxState {
    /// Returns `true` for a ticked checkbox.
    #[must_use]
    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Checked)
    }
}

/// Splits block content at its first line break.
///
/// The returned rest is `None` when the content is a single line, which keeps
/// a trailing newline distinguishable from no newline at all.
pub(crate) fn split_first_line(content: &str) -> (&str, Option<&str>) {
    content
        .split_once('\n')
        .map_or((content, None), |(first, rest)| (first, Some(rest)))
}

/// Joins an edited first line back onto the untouched remainder.
pub(crate) fn join_lines(first: &str, rest: Option<&str>) -> String {
    rest.map_or_else(|| first.to_owned(), |rest| format!("{first}\n{rest}"))
}

/// Parsed first line of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FirstLine<'a> {
    line: &'a str,
    checkbox: Option<CheckboxState>,
    trailing_start: Option<usize>,
}

impl<'a> FirstLine<'a> {
    /// Parses a single line (callers split the block first).
    pub(crate) fn parse(line: &'a str) -> Self {
        let marker_end = list_marker_end(line).unwrap_or(0);
        let has_marker = marker_end > 0;

        let (prefix_end, checkbox) = parse_task_prefix(line, marker_end, has_marker)
            .map_or((marker_end, None), |(end, state)| (end, Some(state)));

        let trailing_start = tail(line, prefix_end)
            .and_then(trailing_attributes_offset)
            .map(|offset| prefix_end + offset);

        Self {
            line,
            checkbox,
            trailing_start,
        }
    }

    /// Returns the checkbox state when the line carries a task prefix.
    pub(crate) const fn checkbox(&self) -> Option<CheckboxState> {
        self.checkbox
    }

    /// Appends `token` to the end of the line, ahead of any trailing
    /// attribute block.
    pub(crate) fn with_appended(&self, token: &str) -> String {
        let Some(start) = self.trailing_start else {
            return format!("{} {token}", self.line);
        };
        let head = self.line.get(..start).unwrap_or_default();
        let attributes = tail(self.line, start).unwrap_or_default();
        format!("{} {token} {attributes}", head.trim_end())
    }
}

fn tail(line: &str, start: usize) -> Option<&str> {
    line.get(start..)
}

/// Returns the byte offset just past a `*`/`-` marker and its whitespace.
fn list_marker_end(line: &str) -> Option<usize> {
    let after_marker = line.strip_prefix(['*', '-'])?;
    let trimmed = after_marker.trim_start();
    if trimmed.len() == after_marker.len() {
        return None;
    }
    Some(line.len() - trimmed.len())
}

/// Parses `[attributes] [checkbox]` starting at `start`.
///
/// Attribute blocks are only recognised after a list marker. Without a
/// marker the checkbox must be followed by whitespace.
fn parse_task_prefix(
    line: &str,
    start: usize,
    has_marker: bool,
) -> Option<(usize, CheckboxState)> {
    let rest = tail(line, start)?;

    if let Some((consumed, state)) = checkbox_at(rest, has_marker) {
        return Some((start + consumed, state));
    }
    if !has_marker || !rest.starts_with("{:") {
        return None;
    }

    // The attribute block may itself contain `}`; take the first closing
    // brace that is followed by a checkbox.
    rest.match_indices('}').find_map(|(close, _)| {
        let after_attributes = tail(rest, close + 1)?;
        let trimmed = after_attributes.trim_start();
        let gap = after_attributes.len() - trimmed.len();
        let (consumed, state) = checkbox_at(trimmed, true)?;
        Some((start + close + 1 + gap + consumed, state))
    })
}

/// Matches a checkbox at the start of `text` and returns the bytes consumed,
/// including any whitespace after it.
fn checkbox_at(text: &str, has_marker: bool) -> Option<(usize, CheckboxState)> {
    let state = if text.starts_with("[ ]") {
        CheckboxState::Unchecked
    } else if text.starts_with("[x]") || text.starts_with("[X]") {
        CheckboxState::Checked
    } else {
        return None;
    };

    let after = tail(text, 3)?;
    let trimmed = after.trim_start();
    let gap = after.len() - trimmed.len();
    if !has_marker && gap == 0 {
        return None;
    }
    Some((3 + gap, state))
}

/// Finds the offset of a `{: ... }` block that closes the line.
fn trailing_attributes_offset(body: &str) -> Option<usize> {
    let start = body.rfind("{:")?;
    let candidate = tail(body, start)?;
    candidate.trim_end().ends_with('}').then_some(start)
}
