//! Error types for bridge domain validation.

use thiserror::Error;

/// Errors returned while constructing bridge domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeDomainError {
    /// The block identifier is empty or contains characters outside
    /// `[A-Za-z0-9-]`.
    #[error("invalid block identifier '{0}', expected [A-Za-z0-9-]+")]
    InvalidBlockId(String),

    /// A remote identifier was empty after trimming.
    #[error("{0} identifier must not be empty")]
    EmptyRemoteId(&'static str),

    /// The completion window ends before it starts.
    #[error("completion window ends at {until} before it starts at {since}")]
    InvertedWindow {
        /// Lower bound as RFC 3339.
        since: String,
        /// Upper bound as RFC 3339.
        until: String,
    },
}
