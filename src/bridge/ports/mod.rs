//! Port contracts for the bridge.
//!
//! Ports define infrastructure-agnostic interfaces to the editor host, the
//! remote task service and settings persistence.

pub mod editor;
pub mod settings;
pub mod task_service;

pub use editor::{EditorHost, EditorHostError, EditorHostResult};
pub use settings::{SettingsStore, SettingsStoreError, SettingsStoreResult};
pub use task_service::{TaskService, TaskServiceError, TaskServiceResult};
