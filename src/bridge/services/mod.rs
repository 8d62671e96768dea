//! Application services for exporting blocks and syncing completions.

mod completion;
mod export;
mod poller;

pub use completion::{
    CompletedBlock, CompletionSyncError, CompletionSyncResult, CompletionSyncService,
    CycleReport, SkipReason, SkippedTask, SyncSummary,
};
pub use export::{
    ExportError, ExportRequest, ExportResult, ExportService, ExportTrigger, ExportWarning,
    ExportedTask,
};
pub use poller::{CycleOutcome, SyncPoller};
