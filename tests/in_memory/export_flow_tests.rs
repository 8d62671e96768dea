//! In-memory integration tests for exporting blocks.

use rstest::rstest;
use siyuan_todoist_sync::bridge::services::{ExportError, ExportRequest, ExportTrigger};
use siyuan_todoist_sync::markup::{has_tag, has_task_link, is_task_block};

use crate::in_memory::helpers::{Bridge, block, bridge};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exported_block_becomes_a_linked_task_item(bridge: Bridge) {
    let id = block("20240101-aaa");
    bridge
        .editor
        .insert_block(&id, "buy milk\n{: id=\"20240101-aaa\"}")
        .expect("seed block");
    let settings = bridge.current_settings().await;

    let exported = bridge
        .export
        .export(&settings, ExportRequest::new(id.clone()))
        .await
        .expect("export should succeed");

    let content = bridge
        .editor
        .content(&id)
        .expect("read block")
        .expect("block exists");
    assert_eq!(content, exported.content());
    assert!(is_task_block(&content));
    assert!(has_tag(&content, "#task#"));
    assert!(has_task_link(&content));
    assert!(content.ends_with("\n{: id=\"20240101-aaa\"}"));
    assert!(content.contains(&exported.task().url()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_export_skips_linked_blocks(bridge: Bridge) {
    let fresh = block("20240101-aaa");
    let linked = block("20240101-bbb");
    bridge.editor.insert_block(&fresh, "one").expect("seed block");
    bridge
        .editor
        .insert_block(&linked, "* [ ] two #task# [»link«](https://app.todoist.com/app/task/9)")
        .expect("seed block");
    let settings = bridge.current_settings().await;

    let results = bridge
        .export
        .export_many(
            &settings,
            [ExportRequest::new(fresh), ExportRequest::new(linked)],
        )
        .await;

    let outcomes: Vec<bool> = results.iter().map(|(_, result)| result.is_ok()).collect();
    assert_eq!(outcomes, [true, false]);
    assert!(results
        .iter()
        .any(|(_, result)| matches!(result, Err(ExportError::AlreadyExported(_)))));
    assert_eq!(bridge.tasks.created_tasks().expect("created").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slash_export_uses_configured_keywords(bridge: Bridge) {
    let id = block("20240101-aaa");
    bridge
        .editor
        .insert_block(&id, "renew passport /ren")
        .expect("seed block");
    let settings = bridge
        .current_settings()
        .await
        .with_slash_keywords("remind, renew");

    let exported = bridge
        .export
        .export(
            &settings,
            ExportRequest::new(id).with_trigger(ExportTrigger::SlashCommand),
        )
        .await
        .expect("export should succeed");

    assert_eq!(exported.task().content(), "renew passport");
    assert!(!exported.content().contains("/ren"));
}
