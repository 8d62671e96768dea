//! In-memory integration tests for the export and completion round trip.

use chrono::Utc;
use rstest::rstest;
use siyuan_todoist_sync::bridge::ports::SettingsStore;
use siyuan_todoist_sync::bridge::services::{CycleOutcome, ExportRequest, SkipReason};
use siyuan_todoist_sync::markup::{CheckboxState, checkbox_state};

use crate::in_memory::helpers::{Bridge, block, bridge};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_an_exported_task_ticks_the_block(bridge: Bridge) {
    let cold = bridge.poller.poll_once().await;
    assert!(matches!(cold, CycleOutcome::ColdStart(_)));

    let id = block("20240101-aaa");
    bridge.editor.insert_block(&id, "buy milk").expect("seed block");
    let settings = bridge.current_settings().await;
    let exported = bridge
        .export
        .export(&settings, ExportRequest::new(id.clone()))
        .await
        .expect("export should succeed");
    let completed = bridge
        .tasks
        .complete_task(exported.task().id(), Utc::now())
        .expect("complete task");
    assert!(completed);

    let outcome = bridge.poller.poll_once().await;
    let CycleOutcome::Synced(summary) = outcome else {
        panic!("expected a synced cycle, got {outcome:?}");
    };
    assert_eq!(summary.completed().len(), 1);

    let content = bridge
        .editor
        .content(&id)
        .expect("read block")
        .expect("block exists");
    assert_eq!(checkbox_state(&content), Some(CheckboxState::Checked));
    assert!(content.contains(&format!("{}) ✔︎", exported.task().url())));

    let again = bridge.poller.poll_once().await;
    let CycleOutcome::Synced(summary) = again else {
        panic!("expected a synced cycle, got {again:?}");
    };
    assert!(summary.completed().is_empty());
    assert!(summary.skipped().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn relabelled_task_is_ignored(bridge: Bridge) {
    bridge.poller.poll_once().await;

    let id = block("20240101-aaa");
    bridge.editor.insert_block(&id, "buy milk").expect("seed block");
    let settings = bridge.current_settings().await;
    let exported = bridge
        .export
        .export(&settings, ExportRequest::new(id.clone()))
        .await
        .expect("export should succeed");
    bridge
        .tasks
        .complete_task(exported.task().id(), Utc::now())
        .expect("complete task");

    bridge
        .settings
        .save(&settings.with_label("errands"))
        .await
        .expect("save settings");
    let outcome = bridge.poller.poll_once().await;

    let CycleOutcome::Synced(summary) = outcome else {
        panic!("expected a synced cycle, got {outcome:?}");
    };
    let reasons: Vec<_> = summary.skipped().iter().map(|skip| skip.reason()).collect();
    assert_eq!(reasons, [SkipReason::MissingLabel]);
    let content = bridge
        .editor
        .content(&id)
        .expect("read block")
        .expect("block exists");
    assert_eq!(checkbox_state(&content), Some(CheckboxState::Unchecked));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cursor_advances_with_every_cycle(bridge: Bridge) {
    bridge.poller.poll_once().await;
    let first = bridge.cursor().await.expect("cursor after cold start");

    bridge.poller.poll_once().await;
    let second = bridge.cursor().await.expect("cursor after sync");

    assert!(second >= first);
}
