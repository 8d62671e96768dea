//! One completion-sync cycle: remote completions back into the editor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bridge::{
    domain::{BlockId, BridgeDomainError, CompletionWindow, RemoteTask, RemoteTaskId},
    ports::{
        EditorHost, EditorHostError, SettingsStore, SettingsStoreError, TaskService,
        TaskServiceError,
    },
};
use crate::markup::{CheckboxState, checkbox_state, mark_task_complete};

/// Why a completed remote task did not change any block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The task lacks the configured label.
    MissingLabel,
    /// The description carries no block back-reference.
    NoBackReference,
    /// The referenced block does not exist.
    BlockNotFound,
    /// Neither the block nor its parent has a checkbox.
    NoCheckbox,
    /// The block is already ticked.
    AlreadyComplete,
    /// The editor host refused to update the block.
    UpdateRejected,
}

/// A completed remote task that was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTask {
    task_id: RemoteTaskId,
    block_id: Option<BlockId>,
    reason: SkipReason,
}

impl SkippedTask {
    /// Returns the remote task.
    #[must_use]
    pub const fn task_id(&self) -> &RemoteTaskId {
        &self.task_id
    }

    /// Returns the referenced block, when there is one.
    #[must_use]
    pub const fn block_id(&self) -> Option<&BlockId> {
        self.block_id.as_ref()
    }

    /// Returns why the task was skipped.
    #[must_use]
    pub const fn reason(&self) -> SkipReason {
        self.reason
    }
}

/// A block ticked because its remote task was completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedBlock {
    task_id: RemoteTaskId,
    block_id: BlockId,
    referenced_block: Option<BlockId>,
}

impl CompletedBlock {
    /// Returns the remote task.
    #[must_use]
    pub const fn task_id(&self) -> &RemoteTaskId {
        &self.task_id
    }

    /// Returns the block that was updated.
    #[must_use]
    pub const fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    /// Returns the child block named by the task when the update was
    /// redirected to its parent.
    #[must_use]
    pub const fn redirected_from(&self) -> Option<&BlockId> {
        self.referenced_block.as_ref()
    }
}

/// Outcome of a cycle that queried the task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    window: CompletionWindow,
    completed: Vec<CompletedBlock>,
    skipped: Vec<SkippedTask>,
}

impl SyncSummary {
    /// Returns the queried window. Its end is the new cursor.
    #[must_use]
    pub const fn window(&self) -> CompletionWindow {
        self.window
    }

    /// Returns the blocks ticked in this cycle.
    #[must_use]
    pub fn completed(&self) -> &[CompletedBlock] {
        &self.completed
    }

    /// Returns the tasks skipped in this cycle.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedTask] {
        &self.skipped
    }
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// The cursor was unset and has been initialised without a query.
    ColdStart {
        /// The new cursor.
        cursor: DateTime<Utc>,
    },
    /// Completed tasks were queried and applied.
    Synced(SyncSummary),
}

/// Failures that abort a cycle without moving the cursor.
#[derive(Debug, Clone, Error)]
pub enum CompletionSyncError {
    /// Settings could not be read or the cursor could not be written.
    #[error(transparent)]
    Settings(#[from] SettingsStoreError),
    /// The task service failed.
    #[error(transparent)]
    TaskService(#[from] TaskServiceError),
    /// The editor host failed.
    #[error(transparent)]
    Editor(#[from] EditorHostError),
    /// The stored cursor produced an invalid window.
    #[error(transparent)]
    Domain(#[from] BridgeDomainError),
}

/// Result type for completion sync operations.
pub type CompletionSyncResult<T> = Result<T, CompletionSyncError>;

enum TaskOutcome {
    Completed(CompletedBlock),
    Skipped(SkippedTask),
}

/// Propagates remote completions into editor checkboxes.
#[derive(Clone)]
pub struct CompletionSyncService<E, T, S, C>
where
    E: EditorHost,
    T: TaskService,
    S: SettingsStore,
    C: Clock + Send + Sync,
{
    editor: Arc<E>,
    tasks: Arc<T>,
    settings: Arc<S>,
    clock: Arc<C>,
}

impl<E, T, S, C> CompletionSyncService<E, T, S, C>
where
    E: EditorHost,
    T: TaskService,
    S: SettingsStore,
    C: Clock + Send + Sync,
{
    /// Creates a new completion sync service.
    #[must_use]
    pub const fn new(editor: Arc<E>, tasks: Arc<T>, settings: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            editor,
            tasks,
            settings,
            clock,
        }
    }

    /// Runs one cycle.
    ///
    /// Without a cursor the cycle only stores the current time. Otherwise it
    /// queries the tasks completed since the cursor, ticks the matching
    /// blocks and moves the cursor to the end of the window once every task
    /// has been handled.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionSyncError`] when the settings store, the task
    /// service or the editor host fails. The cursor is left unchanged, so
    /// the next cycle covers the same window again.
    pub async fn run_cycle(&self) -> CompletionSyncResult<CycleReport> {
        let settings = self.settings.load().await?;
        let now = self.clock.utc();

        let Some(since) = settings.sync_cursor() else {
            self.settings.save_sync_cursor(now).await?;
            info!(cursor = %now, "initialised sync cursor");
            return Ok(CycleReport::ColdStart { cursor: now });
        };

        let window = CompletionWindow::new(since, now.max(since))?;
        let completed_tasks = self.tasks.list_completed_tasks(window).await?;
        debug!(count = completed_tasks.len(), "completed tasks in window");

        let label = settings.label();
        let mut completed = Vec::new();
        let mut skipped = Vec::new();
        for task in &completed_tasks {
            match self.apply(task, label).await? {
                TaskOutcome::Completed(block) => completed.push(block),
                TaskOutcome::Skipped(skip) => skipped.push(skip),
            }
        }

        self.settings.save_sync_cursor(window.until()).await?;
        Ok(CycleReport::Synced(SyncSummary {
            window,
            completed,
            skipped,
        }))
    }

    async fn apply(
        &self,
        task: &RemoteTask,
        label: Option<&str>,
    ) -> CompletionSyncResult<TaskOutcome> {
        let skip = |block_id: Option<BlockId>, reason| {
            TaskOutcome::Skipped(SkippedTask {
                task_id: task.id().clone(),
                block_id,
                reason,
            })
        };

        if label.is_some_and(|label| !task.has_label(label)) {
            return Ok(skip(None, SkipReason::MissingLabel));
        }
        let Some(block_id) = task.back_reference() else {
            return Ok(skip(None, SkipReason::NoBackReference));
        };
        let Some(content) = self.editor.block_content(&block_id).await? else {
            warn!(block_id = %block_id, task_id = %task.id(), "block not found, skipping");
            return Ok(skip(Some(block_id), SkipReason::BlockNotFound));
        };

        let (target, target_content, referenced_block) = match checkbox_state(&content) {
            Some(_) => (block_id, content, None),
            None => match self.checkbox_parent(&block_id).await? {
                Some((parent, parent_content)) => (parent, parent_content, Some(block_id)),
                None => {
                    warn!(
                        block_id = %block_id,
                        task_id = %task.id(),
                        "neither block nor parent has a checkbox, skipping"
                    );
                    return Ok(skip(Some(block_id), SkipReason::NoCheckbox));
                }
            },
        };

        if checkbox_state(&target_content).is_some_and(CheckboxState::is_checked) {
            return Ok(skip(Some(target), SkipReason::AlreadyComplete));
        }

        let updated = mark_task_complete(&target_content);
        match self.editor.update_block_content(&target, &updated).await {
            Ok(()) => {}
            Err(EditorHostError::Rejected { code, message }) => {
                warn!(
                    block_id = %target,
                    task_id = %task.id(),
                    code,
                    message = %message,
                    "editor refused the update, skipping"
                );
                return Ok(skip(Some(target), SkipReason::UpdateRejected));
            }
            Err(err) => return Err(err.into()),
        }
        info!(block_id = %target, task_id = %task.id(), "marked block complete");
        Ok(TaskOutcome::Completed(CompletedBlock {
            task_id: task.id().clone(),
            block_id: target,
            referenced_block,
        }))
    }

    /// Returns the parent of `block_id` with its content when the parent
    /// carries a checkbox.
    async fn checkbox_parent(
        &self,
        block_id: &BlockId,
    ) -> CompletionSyncResult<Option<(BlockId, String)>> {
        let Some(parent) = self.editor.parent_id(block_id).await? else {
            return Ok(None);
        };
        let parent_content = self.editor.block_content(&parent).await?;
        Ok(parent_content
            .filter(|content| checkbox_state(content).is_some())
            .map(|content| (parent, content)))
    }
}
