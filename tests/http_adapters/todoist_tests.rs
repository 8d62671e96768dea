//! Todoist REST v1 client tests.

use chrono::{TimeZone, Utc};
use eyre::{Result, eyre};
use rstest::rstest;
use serde_json::json;
use siyuan_todoist_sync::bridge::{
    adapters::http::TodoistTaskService,
    domain::{BlockId, CompletionWindow, NewRemoteTask, ProjectId, SectionId},
    ports::{TaskService, TaskServiceError},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn client(server: &MockServer) -> Result<TodoistTaskService> {
    Ok(TodoistTaskService::new("secret")?.with_base_url(format!("{}/", server.uri())))
}

#[tokio::test]
async fn create_task_posts_payload_with_bearer_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({
            "content": "buy milk",
            "description": "[»SiYuan task](siyuan://blocks/20240101-aaa)",
            "project_id": "p1",
            "labels": ["siyuan"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "6X7rM8997g3RQmvh",
            "content": "buy milk",
            "description": "[»SiYuan task](siyuan://blocks/20240101-aaa)",
            "labels": ["siyuan"],
            "project_id": "p1",
            "section_id": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task = NewRemoteTask::new("buy milk", "[»SiYuan task](siyuan://blocks/20240101-aaa)")
        .with_project(Some(ProjectId::new("p1")?))
        .with_label("siyuan");
    let created = client(&server)?.create_task(&task).await?;

    assert_eq!(created.id().as_str(), "6X7rM8997g3RQmvh");
    assert_eq!(created.url(), "https://app.todoist.com/app/task/6X7rM8997g3RQmvh");
    assert_eq!(created.project_id(), Some(&ProjectId::new("p1")?));
    assert_eq!(created.section_id(), None);
    Ok(())
}

#[tokio::test]
async fn list_projects_follows_cursor_pages() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("cursor", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "p2", "name": "Work" }],
            "next_cursor": null,
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "p1", "name": "Inbox" }],
            "next_cursor": "page-2",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let projects = client(&server)?.list_projects().await?;

    let names: Vec<_> = projects.iter().map(|project| project.name()).collect();
    assert_eq!(names, ["Inbox", "Work"]);
    Ok(())
}

#[tokio::test]
async fn list_sections_filters_by_project() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sections"))
        .and(query_param("project_id", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "s1", "project_id": "p1", "name": "Chores" }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let project = ProjectId::new("p1")?;
    let sections = client(&server)?.list_sections(Some(&project)).await?;

    let section = sections.first().ok_or_else(|| eyre!("expected a section"))?;
    assert_eq!(section.id(), &SectionId::new("s1")?);
    assert_eq!(section.project_id(), &project);
    Ok(())
}

#[tokio::test]
async fn completed_tasks_are_queried_with_millisecond_window() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/completed/by_completion_date"))
        .and(query_param("since", "2024-05-01T10:00:00.000Z"))
        .and(query_param("until", "2024-05-01T10:05:00.250Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "42",
                "content": "buy milk",
                "description": "[»SiYuan task](siyuan://blocks/20240101-aaa)",
                "labels": ["siyuan"],
                "project_id": "",
                "completed_at": "2024-05-01T10:03:00.000000Z",
            }],
            "next_cursor": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let since = Utc
        .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .single()
        .ok_or_else(|| eyre!("invalid since"))?;
    let until = since + chrono::Duration::milliseconds(300_250);
    let window = CompletionWindow::new(since, until)?;
    let tasks = client(&server)?.list_completed_tasks(window).await?;

    let task = tasks.first().ok_or_else(|| eyre!("expected a task"))?;
    assert_eq!(task.back_reference(), Some(BlockId::new("20240101-aaa")?));
    assert_eq!(task.project_id(), None);
    assert!(task.completed_at().is_some());
    Ok(())
}

#[rstest]
#[case(401)]
#[case(403)]
#[tokio::test]
async fn rejected_token_maps_to_unauthorized(#[case] status: u16) -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(status).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let service = client(&server)?;
    let result = service.list_projects().await;

    assert!(matches!(result, Err(TaskServiceError::Unauthorized)));
    assert!(!service.validate_credentials().await);
    Ok(())
}

#[tokio::test]
async fn server_errors_keep_status_and_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("try later"))
        .mount(&server)
        .await;

    let task = NewRemoteTask::new("buy milk", "");
    let result = client(&server)?.create_task(&task).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Status { status: 500, ref body }) if body == "try later"
    ));
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_an_invalid_response() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client(&server)?.list_projects().await;

    assert!(matches!(result, Err(TaskServiceError::InvalidResponse(_))));
    Ok(())
}

#[tokio::test]
async fn accepted_token_validates() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    assert!(client(&server)?.validate_credentials().await);
    Ok(())
}
