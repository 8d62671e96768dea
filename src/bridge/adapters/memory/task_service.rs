//! In-memory task service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::bridge::{
    domain::{
        CompletionWindow, NewRemoteTask, ProjectId, RemoteProject, RemoteSection, RemoteTask,
        RemoteTaskId,
    },
    ports::{TaskService, TaskServiceError, TaskServiceResult},
};

const FIRST_TASK_ID: u64 = 1000;

/// Thread-safe in-memory task service.
///
/// Created tasks are kept open until [`InMemoryTaskService::complete_task`]
/// moves them into the completed list. Completed tasks can also be seeded
/// directly, which is how tests model tasks created elsewhere.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskService {
    state: Arc<RwLock<InMemoryTaskServiceState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskServiceState {
    projects: Vec<RemoteProject>,
    sections: Vec<RemoteSection>,
    open: Vec<RemoteTask>,
    created: Vec<NewRemoteTask>,
    completed: Vec<RemoteTask>,
    completion_queries: Vec<CompletionWindow>,
    issued: u64,
    failure: Option<TaskServiceError>,
}

impl InMemoryTaskService {
    /// Creates an empty task service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn add_project(&self, project: RemoteProject) -> TaskServiceResult<()> {
        self.write()?.projects.push(project);
        Ok(())
    }

    /// Adds a section.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn add_section(&self, section: RemoteSection) -> TaskServiceResult<()> {
        self.write()?.sections.push(section);
        Ok(())
    }

    /// Seeds a completed task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn add_completed_task(&self, task: RemoteTask) -> TaskServiceResult<()> {
        self.write()?.completed.push(task);
        Ok(())
    }

    /// Completes an open task at `completed_at`.
    ///
    /// Returns `false` when no open task has the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn complete_task(
        &self,
        id: &RemoteTaskId,
        completed_at: DateTime<Utc>,
    ) -> TaskServiceResult<bool> {
        let mut state = self.write()?;
        let Some(position) = state.open.iter().position(|task| task.id() == id) else {
            return Ok(false);
        };
        let task = state.open.remove(position).with_completed_at(completed_at);
        state.completed.push(task);
        Ok(true)
    }

    /// Makes every subsequent call fail with `failure`, or restores normal
    /// operation when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn fail_with(&self, failure: Option<TaskServiceError>) -> TaskServiceResult<()> {
        self.write()?.failure = failure;
        Ok(())
    }

    /// Returns the payloads of every created task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn created_tasks(&self) -> TaskServiceResult<Vec<NewRemoteTask>> {
        Ok(self.read()?.created.clone())
    }

    /// Returns the windows of every completed-task query.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the state lock is
    /// poisoned.
    pub fn completion_queries(&self) -> TaskServiceResult<Vec<CompletionWindow>> {
        Ok(self.read()?.completion_queries.clone())
    }

    fn read(
        &self,
    ) -> TaskServiceResult<std::sync::RwLockReadGuard<'_, InMemoryTaskServiceState>> {
        self.state
            .read()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))
    }

    fn write(
        &self,
    ) -> TaskServiceResult<std::sync::RwLockWriteGuard<'_, InMemoryTaskServiceState>> {
        self.state
            .write()
            .map_err(|err| TaskServiceError::transport(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryTaskServiceState {
    fn check_available(&self) -> TaskServiceResult<()> {
        self.failure.clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl TaskService for InMemoryTaskService {
    async fn create_task(&self, task: &NewRemoteTask) -> TaskServiceResult<RemoteTask> {
        let mut state = self.write()?;
        state.check_available()?;

        let number = FIRST_TASK_ID + state.issued;
        state.issued += 1;
        let id = RemoteTaskId::new(number.to_string())
            .map_err(|err| TaskServiceError::invalid_response(err.to_string()))?;

        let mut created = RemoteTask::new(id, task.content())
            .with_description(task.description())
            .with_labels(task.labels().iter().cloned());
        if let Some(project_id) = task.project_id() {
            created = created.with_project(project_id.clone());
        }
        if let Some(section_id) = task.section_id() {
            created = created.with_section(section_id.clone());
        }

        state.created.push(task.clone());
        state.open.push(created.clone());
        Ok(created)
    }

    async fn list_projects(&self) -> TaskServiceResult<Vec<RemoteProject>> {
        let state = self.read()?;
        state.check_available()?;
        Ok(state.projects.clone())
    }

    async fn list_sections(
        &self,
        project_id: Option<&ProjectId>,
    ) -> TaskServiceResult<Vec<RemoteSection>> {
        let state = self.read()?;
        state.check_available()?;
        Ok(state
            .sections
            .iter()
            .filter(|section| project_id.is_none_or(|id| section.project_id() == id))
            .cloned()
            .collect())
    }

    async fn list_completed_tasks(
        &self,
        window: CompletionWindow,
    ) -> TaskServiceResult<Vec<RemoteTask>> {
        let mut state = self.write()?;
        state.check_available()?;
        state.completion_queries.push(window);
        Ok(state
            .completed
            .iter()
            .filter(|task| {
                task.completed_at().is_some_and(|completed_at| {
                    completed_at >= window.since() && completed_at <= window.until()
                })
            })
            .cloned()
            .collect())
    }
}
