//! Shared world state for export and completion sync BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use siyuan_todoist_sync::bridge::{
    adapters::memory::{InMemoryEditorHost, InMemorySettingsStore, InMemoryTaskService},
    domain::Settings,
    services::{
        CompletionSyncResult, CompletionSyncService, CycleReport, ExportResult, ExportService,
        ExportedTask,
    },
};

/// Completion sync service type used by the BDD world.
pub type TestSyncService = CompletionSyncService<
    InMemoryEditorHost,
    InMemoryTaskService,
    InMemorySettingsStore,
    DefaultClock,
>;

/// Scenario world for export and completion sync behaviour tests.
pub struct CompletionSyncWorld {
    pub editor: Arc<InMemoryEditorHost>,
    pub tasks: Arc<InMemoryTaskService>,
    pub settings: Arc<InMemorySettingsStore>,
    pub export: ExportService<InMemoryEditorHost, InMemoryTaskService>,
    pub sync: TestSyncService,
    pub initial_cursor: Option<DateTime<Utc>>,
    pub last_export: Option<ExportResult<ExportedTask>>,
    pub last_cycle: Option<CompletionSyncResult<CycleReport>>,
}

impl CompletionSyncWorld {
    /// Creates a world around `settings` with empty adapters.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let initial_cursor = settings.sync_cursor();
        let editor = Arc::new(InMemoryEditorHost::new());
        let tasks = Arc::new(InMemoryTaskService::new());
        let store = Arc::new(InMemorySettingsStore::new(settings));
        let export = ExportService::new(Arc::clone(&editor), Arc::clone(&tasks));
        let sync = CompletionSyncService::new(
            Arc::clone(&editor),
            Arc::clone(&tasks),
            Arc::clone(&store),
            Arc::new(DefaultClock),
        );

        Self {
            editor,
            tasks,
            settings: store,
            export,
            sync,
            initial_cursor,
            last_export: None,
            last_cycle: None,
        }
    }

    /// Creates a world whose cursor lies ten minutes in the past.
    #[must_use]
    pub fn with_cursor() -> Self {
        let cursor = Utc::now() - Duration::minutes(10);
        Self::new(
            Settings::default()
                .with_api_token("token")
                .with_sync_cursor(Some(cursor)),
        )
    }
}

impl Default for CompletionSyncWorld {
    fn default() -> Self {
        Self::new(Settings::default().with_api_token("token"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CompletionSyncWorld {
    CompletionSyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
