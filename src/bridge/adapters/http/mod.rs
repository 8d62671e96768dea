//! HTTP adapters for the SiYuan kernel and the Todoist REST API.

mod siyuan;
mod todoist;

pub use siyuan::{DEFAULT_SIYUAN_URL, SiyuanEditorHost};
pub use todoist::{TODOIST_API_URL, TodoistTaskService};
