//! Domain model for the editor/task-service bridge.
//!
//! Identifiers, remote task records, the completion query window, settings
//! with the sync cursor, and back-reference links. Nothing in here performs
//! I/O.

mod error;
mod ids;
pub mod links;
mod poller;
mod remote;
mod settings;

pub use error::BridgeDomainError;
pub use ids::{BlockId, ProjectId, RemoteTaskId, SectionId};
pub use poller::PollerState;
pub use remote::{CompletionWindow, NewRemoteTask, RemoteProject, RemoteSection, RemoteTask};
pub use settings::{
    DEFAULT_LABEL, DEFAULT_SLASH_KEYWORDS, DEFAULT_SYNC_INTERVAL_MINUTES, Settings,
};
