//! Back-reference links between editor blocks and remote tasks.
//!
//! A remote task points at its block through a `siyuan://blocks/<id>` URI in
//! its description; a block points at its task through the web URL wrapped
//! in the sentinel link on its first line.

use super::{BlockId, RemoteTaskId};
use once_cell::sync::Lazy;
use regex::Regex;

/// URI prefix addressing a block inside the editor.
pub const BLOCK_URI_PREFIX: &str = "siyuan://blocks/";

/// Web URL prefix of a task in the remote service.
pub const TASK_WEB_URL_PREFIX: &str = "https://app.todoist.com/app/task/";

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is exercised by unit tests"
)]
static BLOCK_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"siyuan://blocks/([a-zA-Z0-9-]+)").expect("valid block URI regex")
});

/// Formats the editor URI of a block.
#[must_use]
pub fn block_uri(block_id: &BlockId) -> String {
    format!("{BLOCK_URI_PREFIX}{block_id}")
}

/// Formats the remote task description carrying the block back-reference.
#[must_use]
pub fn back_reference_description(block_id: &BlockId) -> String {
    format!("[\u{bb}SiYuan task]({})", block_uri(block_id))
}

/// Formats the web URL of a remote task.
#[must_use]
pub fn task_web_url(task_id: &RemoteTaskId) -> String {
    format!("{TASK_WEB_URL_PREFIX}{task_id}")
}

/// Extracts the first block identifier referenced in `description`.
///
/// Returns `None` for tasks that did not originate in the editor.
#[must_use]
pub fn extract_block_id(description: &str) -> Option<BlockId> {
    let captures = BLOCK_URI.captures(description)?;
    let id = captures.get(1)?;
    BlockId::new(id.as_str()).ok()
}
