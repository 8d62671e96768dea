//! Remote task-service port.

use crate::bridge::domain::{
    CompletionWindow, NewRemoteTask, ProjectId, RemoteProject, RemoteSection, RemoteTask,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Contract of the remote task service.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Creates a task and returns the stored record.
    async fn create_task(&self, task: &NewRemoteTask) -> TaskServiceResult<RemoteTask>;

    /// Lists all projects visible to the credentials.
    async fn list_projects(&self) -> TaskServiceResult<Vec<RemoteProject>>;

    /// Lists sections, optionally restricted to one project.
    async fn list_sections(
        &self,
        project_id: Option<&ProjectId>,
    ) -> TaskServiceResult<Vec<RemoteSection>>;

    /// Lists tasks completed within `window`.
    ///
    /// Tasks completed exactly at either bound are included.
    async fn list_completed_tasks(
        &self,
        window: CompletionWindow,
    ) -> TaskServiceResult<Vec<RemoteTask>>;

    /// Returns `true` when the configured credentials are accepted.
    ///
    /// Any failure to list projects counts as invalid credentials.
    async fn validate_credentials(&self) -> bool {
        self.list_projects().await.is_ok()
    }
}

/// Errors returned by task service implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// The service rejected the credentials.
    #[error("task service rejected the API token")]
    Unauthorized,

    /// The service answered with a non-success status.
    #[error("task service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The service answered with a payload that does not match the contract.
    #[error("unexpected task service response: {0}")]
    InvalidResponse(String),

    /// The service could not be reached.
    #[error("task service transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskServiceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse(reason.into())
    }
}
