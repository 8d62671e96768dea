//! Identifier types for editor blocks and remote task-service records.

use super::BridgeDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a SiYuan block.
///
/// Block identifiers look like `20240101123456-abcdefg`. Only ASCII
/// alphanumerics and `-` are accepted, which keeps the value safe to embed
/// in URIs and kernel SQL queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockId(String);

impl BlockId {
    /// Creates a validated block identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeDomainError::InvalidBlockId`] when the trimmed value is
    /// empty or contains other characters than ASCII alphanumerics and `-`.
    pub fn new(value: impl Into<String>) -> Result<Self, BridgeDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '-');
        if !is_valid {
            return Err(BridgeDomainError::InvalidBlockId(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BlockId {
    type Error = BridgeDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlockId> for String {
    fn from(value: BlockId) -> Self {
        value.0
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declares an opaque, non-empty identifier issued by the task service.
macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from the service-issued value.
            ///
            /// # Errors
            ///
            /// Returns [`BridgeDomainError::EmptyRemoteId`] when the trimmed
            /// value is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, BridgeDomainError> {
                let raw = value.into();
                let normalized = raw.trim();
                if normalized.is_empty() {
                    return Err(BridgeDomainError::EmptyRemoteId($label));
                }
                Ok(Self(normalized.to_owned()))
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BridgeDomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

remote_id!(
    /// Identifier of a task in the remote task service.
    RemoteTaskId,
    "task"
);

remote_id!(
    /// Identifier of a remote project.
    ProjectId,
    "project"
);

remote_id!(
    /// Identifier of a section within a remote project.
    SectionId,
    "section"
);
