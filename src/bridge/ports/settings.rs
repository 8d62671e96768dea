//! Settings persistence port.

use crate::bridge::domain::Settings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for settings store operations.
pub type SettingsStoreResult<T> = Result<T, SettingsStoreError>;

/// Persistence contract for the settings record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Loads the settings, falling back to defaults when nothing is stored.
    async fn load(&self) -> SettingsStoreResult<Settings>;

    /// Replaces the stored settings.
    async fn save(&self, settings: &Settings) -> SettingsStoreResult<()>;

    /// Persists a new sync cursor, keeping every other field as stored.
    ///
    /// The default implementation is a load followed by a save. Stores that
    /// can be written concurrently should override it to make the update
    /// atomic.
    async fn save_sync_cursor(&self, cursor: DateTime<Utc>) -> SettingsStoreResult<()> {
        let settings = self.load().await?.with_sync_cursor(Some(cursor));
        self.save(&settings).await
    }
}

/// Errors returned by settings store implementations.
#[derive(Debug, Clone, Error)]
pub enum SettingsStoreError {
    /// Reading or writing the backing storage failed.
    #[error("settings storage error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),

    /// The stored settings could not be parsed or encoded.
    #[error("settings format error: {0}")]
    Format(Arc<dyn std::error::Error + Send + Sync>),
}

impl SettingsStoreError {
    /// Wraps a storage error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }

    /// Wraps a format error.
    pub fn format(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Format(Arc::new(err))
    }
}
