//! Shared wiring for in-memory bridge integration tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use siyuan_todoist_sync::bridge::{
    adapters::memory::{InMemoryEditorHost, InMemorySettingsStore, InMemoryTaskService},
    domain::{BlockId, Settings},
    ports::SettingsStore,
    services::{CompletionSyncService, ExportService, SyncPoller},
};

/// Export service over the in-memory adapters.
pub type TestExportService = ExportService<InMemoryEditorHost, InMemoryTaskService>;

/// Poller over the in-memory adapters.
pub type TestPoller =
    SyncPoller<InMemoryEditorHost, InMemoryTaskService, InMemorySettingsStore, DefaultClock>;

/// Both services sharing one editor, task service and settings store.
pub struct Bridge {
    pub editor: Arc<InMemoryEditorHost>,
    pub tasks: Arc<InMemoryTaskService>,
    pub settings: Arc<InMemorySettingsStore>,
    pub export: TestExportService,
    pub poller: TestPoller,
}

impl Bridge {
    /// Wires the bridge around `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let editor = Arc::new(InMemoryEditorHost::new());
        let tasks = Arc::new(InMemoryTaskService::new());
        let store = Arc::new(InMemorySettingsStore::new(settings));
        let export = ExportService::new(Arc::clone(&editor), Arc::clone(&tasks));
        let poller = SyncPoller::new(CompletionSyncService::new(
            Arc::clone(&editor),
            Arc::clone(&tasks),
            Arc::clone(&store),
            Arc::new(DefaultClock),
        ));
        Self {
            editor,
            tasks,
            settings: store,
            export,
            poller,
        }
    }

    /// Returns the current settings.
    ///
    /// # Panics
    ///
    /// Panics when the store is unavailable.
    pub async fn current_settings(&self) -> Settings {
        self.settings.load().await.expect("settings should load")
    }

    /// Returns the stored sync cursor.
    pub async fn cursor(&self) -> Option<DateTime<Utc>> {
        self.current_settings().await.sync_cursor()
    }
}

/// Provides a bridge configured with an API token and the default label.
#[fixture]
pub fn bridge() -> Bridge {
    Bridge::new(Settings::default().with_api_token("token"))
}

/// Parses a block identifier.
///
/// # Panics
///
/// Panics when `raw` is not a valid block identifier.
#[must_use]
pub fn block(raw: &str) -> BlockId {
    BlockId::new(raw).expect("valid block id")
}
