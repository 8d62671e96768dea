//! Export of editor blocks as remote tasks.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::bridge::{
    domain::{BlockId, NewRemoteTask, ProjectId, RemoteTask, SectionId, Settings, links},
    ports::{EditorHost, EditorHostError, TaskService, TaskServiceError},
};
use crate::markup::{
    TASK_TAG, add_tag_to_first_line, add_task_link, convert_to_task_block, extract_task_content,
    has_task_link, is_task_block, remove_slash_trigger,
};

/// How the user asked for the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportTrigger {
    /// The block context menu.
    #[default]
    BlockMenu,
    /// The slash command typed inside the block.
    SlashCommand,
}

/// Request to export one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    block_id: BlockId,
    trigger: ExportTrigger,
    enclosing_task_item: Option<bool>,
}

impl ExportRequest {
    /// Creates a block-menu export request.
    #[must_use]
    pub const fn new(block_id: BlockId) -> Self {
        Self {
            block_id,
            trigger: ExportTrigger::BlockMenu,
            enclosing_task_item: None,
        }
    }

    /// Sets the trigger.
    #[must_use]
    pub const fn with_trigger(mut self, trigger: ExportTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Records whether the block already sits inside a task list item.
    ///
    /// When unset, the parent block is inspected.
    #[must_use]
    pub const fn with_enclosing_task_item(mut self, inside: bool) -> Self {
        self.enclosing_task_item = Some(inside);
        self
    }

    /// Returns the block to export.
    #[must_use]
    pub const fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    /// Returns the trigger.
    #[must_use]
    pub const fn trigger(&self) -> ExportTrigger {
        self.trigger
    }
}

/// Non-fatal problem noticed during an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportWarning {
    /// No project matches the configured name; the task went to the inbox.
    ProjectNotFound(String),
    /// No section of the project matches the configured name.
    SectionNotFound(String),
    /// No label is configured, so completion sync cannot pick the task up.
    NoLabelConfigured,
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectNotFound(name) => write!(f, "project \"{name}\" not found"),
            Self::SectionNotFound(name) => write!(f, "section \"{name}\" not found"),
            Self::NoLabelConfigured => {
                f.write_str("no label configured, completion sync will ignore this task")
            }
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTask {
    block_id: BlockId,
    task: RemoteTask,
    content: String,
    warnings: Vec<ExportWarning>,
}

impl ExportedTask {
    /// Returns the exported block.
    #[must_use]
    pub const fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    /// Returns the created remote task.
    #[must_use]
    pub const fn task(&self) -> &RemoteTask {
        &self.task
    }

    /// Returns the block content written back to the editor.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the non-fatal problems noticed during the export.
    #[must_use]
    pub fn warnings(&self) -> &[ExportWarning] {
        &self.warnings
    }
}

/// Service-level errors for exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No API token is configured.
    #[error("no task service API token is configured")]
    MissingApiToken,
    /// Another export of the same block is still running.
    #[error("block {0} is already being exported")]
    AlreadyInFlight(BlockId),
    /// The block does not exist or is empty.
    #[error("block {0} not found")]
    BlockNotFound(BlockId),
    /// The block already links to a remote task.
    #[error("block {0} has already been exported")]
    AlreadyExported(BlockId),
    /// The block has no text to use as task title.
    #[error("block {0} has no text to use as task title")]
    EmptyTitle(BlockId),
    /// The editor host failed.
    #[error(transparent)]
    Editor(#[from] EditorHostError),
    /// The task service failed.
    #[error(transparent)]
    TaskService(#[from] TaskServiceError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Sends editor blocks to the task service and links them back.
#[derive(Clone)]
pub struct ExportService<E, T>
where
    E: EditorHost,
    T: TaskService,
{
    editor: Arc<E>,
    tasks: Arc<T>,
    in_flight: Arc<Mutex<HashSet<BlockId>>>,
}

impl<E, T> ExportService<E, T>
where
    E: EditorHost,
    T: TaskService,
{
    /// Creates a new export service.
    #[must_use]
    pub fn new(editor: Arc<E>, tasks: Arc<T>) -> Self {
        Self {
            editor,
            tasks,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Exports one block.
    ///
    /// The block is written back only after the remote task exists, so a
    /// failure leaves the block untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when no token is configured, the block is
    /// already being exported, missing, already linked or without text, or
    /// when the editor host or the task service fails.
    #[instrument(skip_all, fields(block_id = %request.block_id()))]
    pub async fn export(
        &self,
        settings: &Settings,
        request: ExportRequest,
    ) -> ExportResult<ExportedTask> {
        if settings.api_token().is_none() {
            return Err(ExportError::MissingApiToken);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight, request.block_id())?;
        let block_id = request.block_id().clone();

        let mut content = self
            .editor
            .block_content(&block_id)
            .await?
            .ok_or_else(|| ExportError::BlockNotFound(block_id.clone()))?;

        if request.trigger() == ExportTrigger::SlashCommand {
            content = remove_slash_trigger(&content, &settings.slash_keywords());
        }
        if has_task_link(&content) {
            return Err(ExportError::AlreadyExported(block_id));
        }

        let title = extract_task_content(&content);
        if title.is_empty() {
            return Err(ExportError::EmptyTitle(block_id));
        }

        if !is_task_block(&content) && !self.inside_task_item(&request).await? {
            content = convert_to_task_block(&content);
        }
        content = add_tag_to_first_line(&content, TASK_TAG);

        let mut warnings = Vec::new();
        let (project_id, section_id) = self.resolve_destination(settings, &mut warnings).await?;
        let mut new_task = NewRemoteTask::new(title, links::back_reference_description(&block_id))
            .with_project(project_id)
            .with_section(section_id);
        match settings.label() {
            Some(label) => new_task = new_task.with_label(label),
            None => warnings.push(ExportWarning::NoLabelConfigured),
        }
        for warning in &warnings {
            warn!(%warning, "export warning");
        }

        let task = self.tasks.create_task(&new_task).await?;
        content = add_task_link(&content, &task.url());
        self.editor.update_block_content(&block_id, &content).await?;
        info!(task_id = %task.id(), "exported block");

        Ok(ExportedTask {
            block_id,
            task,
            content,
            warnings,
        })
    }

    /// Exports several blocks one after another.
    ///
    /// Every block gets its own result; a failure does not stop the batch.
    pub async fn export_many(
        &self,
        settings: &Settings,
        requests: impl IntoIterator<Item = ExportRequest>,
    ) -> Vec<(BlockId, ExportResult<ExportedTask>)> {
        let mut results = Vec::new();
        for request in requests {
            let block_id = request.block_id().clone();
            let result = self.export(settings, request).await;
            results.push((block_id, result));
        }
        results
    }

    async fn inside_task_item(&self, request: &ExportRequest) -> ExportResult<bool> {
        if let Some(inside) = request.enclosing_task_item {
            return Ok(inside);
        }
        let Some(parent) = self.editor.parent_id(request.block_id()).await? else {
            return Ok(false);
        };
        let parent_content = self.editor.block_content(&parent).await?;
        Ok(parent_content.is_some_and(|content| is_task_block(&content)))
    }

    async fn resolve_destination(
        &self,
        settings: &Settings,
        warnings: &mut Vec<ExportWarning>,
    ) -> ExportResult<(Option<ProjectId>, Option<SectionId>)> {
        let Some(project_name) = settings.project_name() else {
            return Ok((None, None));
        };
        let projects = self.tasks.list_projects().await?;
        let Some(project) = projects.into_iter().find(|project| project.is_named(project_name))
        else {
            warnings.push(ExportWarning::ProjectNotFound(project_name.to_owned()));
            return Ok((None, None));
        };
        let project_id = project.id().clone();

        let Some(section_name) = settings.section_name() else {
            return Ok((Some(project_id), None));
        };
        let sections = self.tasks.list_sections(Some(&project_id)).await?;
        let section_id = sections
            .into_iter()
            .find(|section| section.is_named(section_name))
            .map(|section| section.id().clone());
        if section_id.is_none() {
            warnings.push(ExportWarning::SectionNotFound(section_name.to_owned()));
        }
        Ok((Some(project_id), section_id))
    }
}

/// Marks a block as being exported until dropped.
struct InFlightGuard {
    blocks: Arc<Mutex<HashSet<BlockId>>>,
    block_id: BlockId,
}

impl InFlightGuard {
    fn acquire(blocks: &Arc<Mutex<HashSet<BlockId>>>, block_id: &BlockId) -> ExportResult<Self> {
        let inserted = blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(block_id.clone());
        if !inserted {
            return Err(ExportError::AlreadyInFlight(block_id.clone()));
        }
        Ok(Self {
            blocks: Arc::clone(blocks),
            block_id: block_id.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.block_id);
    }
}
