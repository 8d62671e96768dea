//! Then steps for export and completion sync BDD scenarios.

use super::world::{CompletionSyncWorld, run_async};
use rstest_bdd_macros::then;
use siyuan_todoist_sync::bridge::{
    domain::BlockId, ports::SettingsStore, services::CycleReport,
};
use siyuan_todoist_sync::markup::is_task_block;

fn block_content(world: &CompletionSyncWorld, id: String) -> Result<String, eyre::Report> {
    let id = BlockId::new(id)?;
    world
        .editor
        .content(&id)?
        .ok_or_else(|| eyre::eyre!("block {id} does not exist"))
}

#[then(r#"the block "{id}" reads "{content}""#)]
fn block_reads(
    world: &CompletionSyncWorld,
    id: String,
    content: String,
) -> Result<(), eyre::Report> {
    let actual = block_content(world, id)?;
    if actual != content {
        return Err(eyre::eyre!("expected block content {content:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the block "{id}" has no checkbox"#)]
fn block_has_no_checkbox(world: &CompletionSyncWorld, id: String) -> Result<(), eyre::Report> {
    let actual = block_content(world, id)?;
    if is_task_block(&actual) {
        return Err(eyre::eyre!("expected no checkbox, found {actual:?}"));
    }
    Ok(())
}

#[then("the cycle was a cold start")]
fn cycle_was_cold_start(world: &CompletionSyncWorld) -> Result<(), eyre::Report> {
    match world.last_cycle.as_ref() {
        Some(Ok(CycleReport::ColdStart { .. })) => Ok(()),
        other => Err(eyre::eyre!("expected a cold start, found {other:?}")),
    }
}

#[then("no completed tasks were queried")]
fn no_completed_tasks_queried(world: &CompletionSyncWorld) -> Result<(), eyre::Report> {
    let queries = world.tasks.completion_queries()?;
    if !queries.is_empty() {
        return Err(eyre::eyre!("expected no queries, found {}", queries.len()));
    }
    Ok(())
}

#[then("the cycle was aborted")]
fn cycle_was_aborted(world: &CompletionSyncWorld) -> Result<(), eyre::Report> {
    match world.last_cycle.as_ref() {
        Some(Err(_)) => Ok(()),
        other => Err(eyre::eyre!("expected an aborted cycle, found {other:?}")),
    }
}

#[then("the sync cursor is unchanged")]
fn cursor_unchanged(world: &CompletionSyncWorld) -> Result<(), eyre::Report> {
    let cursor = run_async(world.settings.load())?.sync_cursor();
    if cursor != world.initial_cursor {
        return Err(eyre::eyre!(
            "expected cursor {:?}, found {cursor:?}",
            world.initial_cursor
        ));
    }
    Ok(())
}
