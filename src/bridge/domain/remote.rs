//! Remote task-service records as seen by the bridge.

use super::{BlockId, BridgeDomainError, ProjectId, RemoteTaskId, SectionId, links};
use chrono::{DateTime, Utc};

/// A task stored in the remote task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTask {
    id: RemoteTaskId,
    content: String,
    description: String,
    labels: Vec<String>,
    project_id: Option<ProjectId>,
    section_id: Option<SectionId>,
    completed_at: Option<DateTime<Utc>>,
}

impl RemoteTask {
    /// Creates a task record with an empty description and no labels.
    #[must_use]
    pub fn new(id: RemoteTaskId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            description: String::new(),
            labels: Vec::new(),
            project_id: None,
            section_id: None,
            completed_at: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Sets the owning project.
    #[must_use]
    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Sets the owning section.
    #[must_use]
    pub fn with_section(mut self, section_id: SectionId) -> Self {
        self.section_id = Some(section_id);
        self
    }

    /// Marks the task completed at `completed_at`.
    #[must_use]
    pub const fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &RemoteTaskId {
        &self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the project identifier, if assigned.
    #[must_use]
    pub const fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Returns the section identifier, if assigned.
    #[must_use]
    pub const fn section_id(&self) -> Option<&SectionId> {
        self.section_id.as_ref()
    }

    /// Returns the completion timestamp of a completed task.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the web URL of the task.
    #[must_use]
    pub fn url(&self) -> String {
        links::task_web_url(&self.id)
    }

    /// Returns `true` when the task carries `label` (exact match).
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|candidate| candidate == label)
    }

    /// Returns the editor block referenced from the description.
    #[must_use]
    pub fn back_reference(&self) -> Option<BlockId> {
        links::extract_block_id(&self.description)
    }
}

/// Payload for creating a remote task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemoteTask {
    content: String,
    description: String,
    project_id: Option<ProjectId>,
    section_id: Option<SectionId>,
    labels: Vec<String>,
}

impl NewRemoteTask {
    /// Creates a payload with the task title and description.
    #[must_use]
    pub fn new(content: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            description: description.into(),
            project_id: None,
            section_id: None,
            labels: Vec::new(),
        }
    }

    /// Assigns the task to a project.
    #[must_use]
    pub fn with_project(mut self, project_id: Option<ProjectId>) -> Self {
        self.project_id = project_id;
        self
    }

    /// Assigns the task to a section.
    #[must_use]
    pub fn with_section(mut self, section_id: Option<SectionId>) -> Self {
        self.section_id = section_id;
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Returns the task title.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the project identifier, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Returns the section identifier, if any.
    #[must_use]
    pub const fn section_id(&self) -> Option<&SectionId> {
        self.section_id.as_ref()
    }

    /// Returns the labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A remote project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProject {
    id: ProjectId,
    name: String,
}

impl RemoteProject {
    /// Creates a project record.
    #[must_use]
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> &ProjectId {
        &self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when `name` equals the project name ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

/// A section within a remote project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSection {
    id: SectionId,
    project_id: ProjectId,
    name: String,
}

impl RemoteSection {
    /// Creates a section record.
    #[must_use]
    pub fn new(id: SectionId, project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
        }
    }

    /// Returns the section identifier.
    #[must_use]
    pub const fn id(&self) -> &SectionId {
        &self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns the section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when `name` equals the section name ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Time window of a completed-task query.
///
/// Both bounds are sent to the service as-is. The service includes tasks
/// completed exactly at either bound, so consecutive windows share one
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionWindow {
    since: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl CompletionWindow {
    /// Creates a window from `since` to `until`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeDomainError::InvertedWindow`] when `until` is earlier
    /// than `since`.
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Self, BridgeDomainError> {
        if until < since {
            return Err(BridgeDomainError::InvertedWindow {
                since: since.to_rfc3339(),
                until: until.to_rfc3339(),
            });
        }
        Ok(Self { since, until })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn since(&self) -> DateTime<Utc> {
        self.since
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn until(&self) -> DateTime<Utc> {
        self.until
    }
}
