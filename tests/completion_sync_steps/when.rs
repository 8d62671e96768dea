//! When steps for export and completion sync BDD scenarios.

use super::world::{CompletionSyncWorld, run_async};
use chrono::Utc;
use rstest_bdd_macros::when;
use siyuan_todoist_sync::bridge::{
    domain::BlockId, ports::SettingsStore, services::ExportRequest,
};

#[when(r#"the block "{id}" is exported"#)]
fn export_block(world: &mut CompletionSyncWorld, id: String) -> Result<(), eyre::Report> {
    let id = BlockId::new(id)?;
    let settings = run_async(world.settings.load())?;
    let result = run_async(world.export.export(&settings, ExportRequest::new(id)));
    world.last_export = Some(result);
    Ok(())
}

#[when("the exported task is completed remotely")]
fn complete_exported_task(world: &mut CompletionSyncWorld) -> Result<(), eyre::Report> {
    let exported = match world.last_export.as_ref() {
        Some(Ok(exported)) => exported,
        Some(Err(err)) => return Err(eyre::eyre!("export failed: {err}")),
        None => return Err(eyre::eyre!("no block has been exported")),
    };
    if !world.tasks.complete_task(exported.task().id(), Utc::now())? {
        return Err(eyre::eyre!("exported task is not open"));
    }
    Ok(())
}

#[when("a completion cycle runs")]
fn run_cycle(world: &mut CompletionSyncWorld) {
    world.last_cycle = Some(run_async(world.sync.run_cycle()));
}
