//! Markup transformer for SiYuan kramdown block content.
//!
//! Pure functions that turn an editor block into a task representation and
//! back: checkbox detection and creation, the `#task#` tag, the sentinel
//! `[»link«](url)` back-reference, slash-trigger cleanup and plain title
//! extraction. Only the narrow subset of kramdown needed for round-tripping
//! is understood; everything else is carried through untouched.
//!
//! Edits are applied to the first line only, which is parsed into a
//! structured prefix/body/trailing-attributes view before mutation.

mod annotations;
mod checkbox;
mod first_line;
mod slash;
mod title;

pub use annotations::{add_tag_to_first_line, add_task_link, has_tag, has_task_link, task_link};
pub use checkbox::{checkbox_state, convert_to_task_block, is_task_block, mark_task_complete};
pub use first_line::CheckboxState;
pub use slash::remove_slash_trigger;
pub use title::extract_task_content;

/// Tag marking a block as exported to the task service.
pub const TASK_TAG: &str = "#task#";

/// Reserved link text of the block-to-task back-reference.
pub const LINK_SENTINEL: &str = "[»link«]";

/// Glyph appended after the sentinel link once the task is complete.
pub const COMPLETION_GLYPH: &str = "✔︎";

#[cfg(test)]
mod tests;
