//! SiYuan kernel API client tests.

use eyre::Result;
use serde_json::json;
use siyuan_todoist_sync::bridge::{
    adapters::http::SiyuanEditorHost,
    domain::BlockId,
    ports::{EditorHost, EditorHostError},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "", "data": data }))
}

#[tokio::test]
async fn block_content_reads_kramdown_with_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/block/getBlockKramdown"))
        .and(header("authorization", "Token kernel-token"))
        .and(body_json(json!({ "id": "20240101-aaa" })))
        .respond_with(ok(json!({
            "id": "20240101-aaa",
            "kramdown": "* [ ] buy milk\n{: id=\"20240101-aaa\"}",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?.with_token(Some("kernel-token".to_owned()));
    let content = host.block_content(&BlockId::new("20240101-aaa")?).await?;

    assert_eq!(
        content.as_deref(),
        Some("* [ ] buy milk\n{: id=\"20240101-aaa\"}")
    );
    Ok(())
}

#[tokio::test]
async fn empty_kramdown_means_missing_block() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/block/getBlockKramdown"))
        .respond_with(ok(json!({ "id": "20240101-aaa", "kramdown": "" })))
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?;

    assert_eq!(host.block_content(&BlockId::new("20240101-aaa")?).await?, None);
    Ok(())
}

#[tokio::test]
async fn update_block_sends_markdown() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/block/updateBlock"))
        .and(body_json(json!({
            "id": "20240101-aaa",
            "dataType": "markdown",
            "data": "* [x] buy milk",
        })))
        .respond_with(ok(json!([{ "doOperations": [] }])))
        .expect(1)
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?;
    host.update_block_content(&BlockId::new("20240101-aaa")?, "* [x] buy milk")
        .await?;
    Ok(())
}

#[tokio::test]
async fn non_zero_code_is_rejected() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/block/updateBlock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": -1,
            "msg": "block not found",
            "data": null,
        })))
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?;
    let result = host
        .update_block_content(&BlockId::new("20240101-aaa")?, "text")
        .await;

    assert!(matches!(
        result,
        Err(EditorHostError::Rejected { code: -1, ref message }) if message == "block not found"
    ));
    Ok(())
}

#[tokio::test]
async fn http_failure_is_a_transport_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/block/getBlockKramdown"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?;
    let result = host.block_content(&BlockId::new("20240101-aaa")?).await;

    assert!(matches!(result, Err(EditorHostError::Transport(_))));
    Ok(())
}

#[tokio::test]
async fn parent_is_looked_up_through_sql() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query/sql"))
        .and(body_json(json!({
            "stmt": "SELECT parent_id FROM blocks WHERE id = '20240101-para'",
        })))
        .respond_with(ok(json!([{ "parent_id": "20240101-item" }])))
        .expect(1)
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?;
    let parent = host.parent_id(&BlockId::new("20240101-para")?).await?;

    assert_eq!(parent, Some(BlockId::new("20240101-item")?));
    Ok(())
}

#[tokio::test]
async fn top_level_block_has_no_parent() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query/sql"))
        .respond_with(ok(json!([{ "parent_id": "" }])))
        .mount(&server)
        .await;

    let host = SiyuanEditorHost::new(server.uri())?;

    assert_eq!(host.parent_id(&BlockId::new("20240101-doc")?).await?, None);
    Ok(())
}
