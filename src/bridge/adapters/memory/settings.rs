//! In-memory settings store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::bridge::{
    domain::Settings,
    ports::{SettingsStore, SettingsStoreError, SettingsStoreResult},
};

/// Thread-safe in-memory settings store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsStore {
    state: Arc<RwLock<InMemorySettingsState>>,
}

#[derive(Debug, Default)]
struct InMemorySettingsState {
    settings: Settings,
    cursor_writes: usize,
    unavailable: bool,
}

impl InMemorySettingsStore {
    /// Creates a store holding `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemorySettingsState {
                settings,
                ..InMemorySettingsState::default()
            })),
        }
    }

    /// Returns the number of cursor writes so far.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsStoreError::Io`] when the state lock is poisoned.
    pub fn cursor_writes(&self) -> SettingsStoreResult<usize> {
        Ok(self.read()?.cursor_writes)
    }

    /// Makes every subsequent call fail, or restores normal operation.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsStoreError::Io`] when the state lock is poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> SettingsStoreResult<()> {
        self.write()?.unavailable = unavailable;
        Ok(())
    }

    fn read(&self) -> SettingsStoreResult<std::sync::RwLockReadGuard<'_, InMemorySettingsState>> {
        self.state
            .read()
            .map_err(|err| SettingsStoreError::io(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> SettingsStoreResult<std::sync::RwLockWriteGuard<'_, InMemorySettingsState>> {
        self.state
            .write()
            .map_err(|err| SettingsStoreError::io(std::io::Error::other(err.to_string())))
    }
}

fn unavailable_error() -> SettingsStoreError {
    SettingsStoreError::io(std::io::Error::other("settings store unavailable"))
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> SettingsStoreResult<Settings> {
        let state = self.read()?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        Ok(state.settings.clone())
    }

    async fn save(&self, settings: &Settings) -> SettingsStoreResult<()> {
        let mut state = self.write()?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        state.settings = settings.clone();
        Ok(())
    }

    async fn save_sync_cursor(&self, cursor: DateTime<Utc>) -> SettingsStoreResult<()> {
        let mut state = self.write()?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        state.settings = state.settings.clone().with_sync_cursor(Some(cursor));
        state.cursor_writes += 1;
        Ok(())
    }
}
