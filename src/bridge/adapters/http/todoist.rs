//! Todoist REST v1 client implementing the task service port.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::bridge::{
    domain::{
        CompletionWindow, NewRemoteTask, ProjectId, RemoteProject, RemoteSection, RemoteTask,
        RemoteTaskId, SectionId,
    },
    ports::{TaskService, TaskServiceError, TaskServiceResult},
};

/// Production API root.
pub const TODOIST_API_URL: &str = "https://api.todoist.com/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Task service backed by the Todoist REST v1 API.
#[derive(Debug, Clone)]
pub struct TodoistTaskService {
    client: Client,
    base_url: String,
    token: String,
}

impl TodoistTaskService {
    /// Creates a client for the production API authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(token: impl Into<String>) -> TaskServiceResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TaskServiceError::transport)?;
        Ok(Self {
            client,
            base_url: TODOIST_API_URL.to_owned(),
            token: token.into(),
        })
    }

    /// Points the client at another API root, such as a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
    }

    /// Fetches every page of a cursor-paginated list endpoint.
    async fn get_all<T>(&self, path: &str, query: &[(&str, String)]) -> TaskServiceResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut request = self.get(path).query(query);
            if let Some(next) = cursor.as_deref() {
                request = request.query(&[("cursor", next)]);
            }
            let page: Page<T> = decode(send(request).await?).await?;
            items.extend(page.results);

            let Some(next) = page.next_cursor.filter(|next| !next.is_empty()) else {
                return Ok(items);
            };
            cursor = Some(next);
        }
    }
}

async fn send(request: RequestBuilder) -> TaskServiceResult<Response> {
    let response = request.send().await.map_err(TaskServiceError::transport)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(TaskServiceError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TaskServiceError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> TaskServiceResult<T> {
    response
        .json()
        .await
        .map_err(|err| TaskServiceError::invalid_response(err.to_string()))
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl TaskService for TodoistTaskService {
    #[instrument(skip_all, fields(content = task.content()))]
    async fn create_task(&self, task: &NewRemoteTask) -> TaskServiceResult<RemoteTask> {
        let body = CreateTaskBody {
            content: task.content(),
            description: task.description(),
            project_id: task.project_id().map(ProjectId::as_str),
            section_id: task.section_id().map(SectionId::as_str),
            labels: task.labels(),
        };
        let request = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .bearer_auth(&self.token)
            .json(&body);
        let created: WireTask = decode(send(request).await?).await?;
        debug!(task_id = %created.id, "created remote task");
        created.try_into()
    }

    #[instrument(skip_all)]
    async fn list_projects(&self) -> TaskServiceResult<Vec<RemoteProject>> {
        let projects: Vec<WireProject> = self.get_all("/projects", &[]).await?;
        projects.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip_all, fields(project_id = project_id.map(ProjectId::as_str)))]
    async fn list_sections(
        &self,
        project_id: Option<&ProjectId>,
    ) -> TaskServiceResult<Vec<RemoteSection>> {
        let query: Vec<(&str, String)> = project_id
            .map(|id| ("project_id", id.as_str().to_owned()))
            .into_iter()
            .collect();
        let sections: Vec<WireSection> = self.get_all("/sections", &query).await?;
        sections.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip_all, fields(since = %window.since(), until = %window.until()))]
    async fn list_completed_tasks(
        &self,
        window: CompletionWindow,
    ) -> TaskServiceResult<Vec<RemoteTask>> {
        let query = [
            ("since", timestamp(window.since())),
            ("until", timestamp(window.until())),
        ];
        let tasks: Vec<WireTask> = self
            .get_all("/tasks/completed/by_completion_date", &query)
            .await?;
        debug!(count = tasks.len(), "fetched completed tasks");
        tasks.into_iter().map(TryInto::try_into).collect()
    }
}

/// One page of a list endpoint. Completed tasks arrive under `items`.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new", alias = "items")]
    results: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateTaskBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section_id: Option<&'a str>,
    #[serde(skip_serializing_if = "no_labels")]
    labels: &'a [String],
}

const fn no_labels(labels: &&[String]) -> bool {
    labels.is_empty()
}

#[derive(Debug, Deserialize)]
struct WireTask {
    id: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    section_id: Option<String>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<WireTask> for RemoteTask {
    type Error = TaskServiceError;

    fn try_from(wire: WireTask) -> Result<Self, Self::Error> {
        let id = RemoteTaskId::new(wire.id).map_err(invalid)?;
        let mut task = Self::new(id, wire.content)
            .with_description(wire.description)
            .with_labels(wire.labels);
        if let Some(project_id) = non_empty(wire.project_id) {
            task = task.with_project(ProjectId::new(project_id).map_err(invalid)?);
        }
        if let Some(section_id) = non_empty(wire.section_id) {
            task = task.with_section(SectionId::new(section_id).map_err(invalid)?);
        }
        if let Some(completed_at) = wire.completed_at {
            task = task.with_completed_at(completed_at);
        }
        Ok(task)
    }
}

#[derive(Debug, Deserialize)]
struct WireProject {
    id: String,
    name: String,
}

impl TryFrom<WireProject> for RemoteProject {
    type Error = TaskServiceError;

    fn try_from(wire: WireProject) -> Result<Self, Self::Error> {
        Ok(Self::new(ProjectId::new(wire.id).map_err(invalid)?, wire.name))
    }
}

#[derive(Debug, Deserialize)]
struct WireSection {
    id: String,
    project_id: String,
    name: String,
}

impl TryFrom<WireSection> for RemoteSection {
    type Error = TaskServiceError;

    fn try_from(wire: WireSection) -> Result<Self, Self::Error> {
        Ok(Self::new(
            SectionId::new(wire.id).map_err(invalid)?,
            ProjectId::new(wire.project_id).map_err(invalid)?,
            wire.name,
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|inner| !inner.is_empty())
}

fn invalid(err: impl std::fmt::Display) -> TaskServiceError {
    TaskServiceError::invalid_response(err.to_string())
}
