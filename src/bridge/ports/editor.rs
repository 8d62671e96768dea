//! Editor host port: block content access in the note editor.

use crate::bridge::domain::BlockId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for editor host operations.
pub type EditorHostResult<T> = Result<T, EditorHostError>;

/// Block access contract of the editor host.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Returns the raw kramdown of a block.
    ///
    /// Returns `None` when the block does not exist or has no content.
    async fn block_content(&self, id: &BlockId) -> EditorHostResult<Option<String>>;

    /// Replaces the content of a block with markdown.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Rejected`] when the host refuses the update
    /// or [`EditorHostError::Transport`] when it cannot be reached.
    async fn update_block_content(&self, id: &BlockId, content: &str) -> EditorHostResult<()>;

    /// Returns the structural parent of a block.
    ///
    /// Returns `None` for document roots and unknown blocks.
    async fn parent_id(&self, id: &BlockId) -> EditorHostResult<Option<BlockId>>;
}

/// Errors returned by editor host implementations.
#[derive(Debug, Clone, Error)]
pub enum EditorHostError {
    /// The host answered with a non-zero status code.
    #[error("editor host rejected the request (code {code}): {message}")]
    Rejected {
        /// Host status code.
        code: i64,
        /// Host message.
        message: String,
    },

    /// The host could not be reached or answered with an unreadable payload.
    #[error("editor host transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl EditorHostError {
    /// Creates a rejection error.
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
