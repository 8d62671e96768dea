//! In-memory adapter implementations for testing.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! unit testing and local dry runs without an editor or network access.

mod editor;
mod settings;
mod task_service;

pub use editor::InMemoryEditorHost;
pub use settings::InMemorySettingsStore;
pub use task_service::InMemoryTaskService;
