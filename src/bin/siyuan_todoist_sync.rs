//! Sends SiYuan blocks to Todoist and ticks them when their tasks complete.
//!
//! Usage:
//!
//! ```text
//! siyuan-todoist-sync [--settings PATH] [--siyuan-url URL] <command>
//! ```
//!
//! Commands:
//!
//! - `send <BLOCK_ID>... [--slash]` exports blocks as Todoist tasks.
//! - `poll` runs one completion-sync cycle.
//! - `run` polls on the configured interval until interrupted.
//! - `validate` checks the configured API token.
//!
//! The settings file uses the plugin's JSON schema. A representative file is:
//!
//! ```json
//! {
//!   "apiToken": "0123456789abcdef",
//!   "projectName": "Inbox",
//!   "sectionName": "",
//!   "defaultLabel": "siyuan",
//!   "slashKeywords": "sendtotodoist, todoist, todo, task",
//!   "syncInterval": 5,
//!   "lastSyncTime": "2024-05-01T10:00:00.000Z"
//! }
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use siyuan_todoist_sync::bridge::{
    adapters::{
        JsonFileSettingsStore,
        http::{DEFAULT_SIYUAN_URL, SiyuanEditorHost, TodoistTaskService},
    },
    domain::{BlockId, BridgeDomainError, Settings},
    ports::{
        EditorHostError, SettingsStore, SettingsStoreError, TaskService, TaskServiceError,
    },
    services::{
        CompletionSyncError, CompletionSyncService, CycleOutcome, ExportRequest, ExportService,
        ExportTrigger, SyncPoller,
    },
};
use siyuan_todoist_sync::logging::{DEFAULT_LOG_LEVEL, init_subscriber};
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::{error, info};

const DEFAULT_SETTINGS_PATH: &str = "siyuan-todoist-sync.json";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Poller = SyncPoller<SiyuanEditorHost, TodoistTaskService, JsonFileSettingsStore, DefaultClock>;

#[derive(Debug, Parser)]
#[command(name = "siyuan-todoist-sync", version)]
#[command(about = "Send SiYuan blocks to Todoist and sync completions back")]
struct Cli {
    /// Settings file in the plugin's JSON format.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_PATH)]
    settings: Utf8PathBuf,

    /// Base URL of the SiYuan kernel.
    #[arg(long, global = true, env = "SIYUAN_URL", default_value = DEFAULT_SIYUAN_URL)]
    siyuan_url: String,

    /// SiYuan API token, when the kernel requires one.
    #[arg(long, global = true, env = "SIYUAN_TOKEN", hide_env_values = true)]
    siyuan_token: Option<String>,

    /// Todoist API token; overrides `apiToken` from the settings file.
    #[arg(long, global = true, env = "TODOIST_API_TOKEN", hide_env_values = true)]
    todoist_token: Option<String>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export blocks as Todoist tasks.
    Send {
        /// Blocks to export.
        #[arg(required = true)]
        block_ids: Vec<String>,
        /// Remove the slash-command text typed to trigger the export.
        #[arg(long)]
        slash: bool,
    },
    /// Run one completion-sync cycle.
    Poll,
    /// Poll for completions on the configured interval until Ctrl-C.
    Run,
    /// Check that the Todoist API token is accepted.
    Validate,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("no Todoist API token configured; set apiToken or TODOIST_API_TOKEN")]
    MissingApiToken,
    #[error("Todoist rejected the API token")]
    InvalidCredentials,
    #[error("{failed} of {total} exports failed")]
    ExportFailed { failed: usize, total: usize },
    #[error(transparent)]
    Settings(#[from] SettingsStoreError),
    #[error(transparent)]
    TaskService(#[from] TaskServiceError),
    #[error(transparent)]
    Editor(#[from] EditorHostError),
    #[error(transparent)]
    Domain(#[from] BridgeDomainError),
    #[error(transparent)]
    Sync(#[from] CompletionSyncError),
    #[error("i/o failed: {0}")]
    Io(#[from] io::Error),
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    init_subscriber(&cli.log_level);

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(&cli)).map_err(|err| {
        error!(error = %err, "command failed");
        err.into()
    })
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let store = Arc::new(JsonFileSettingsStore::open(&cli.settings)?);
    let mut settings = store.load().await?;
    if let Some(token) = cli.todoist_token.clone() {
        settings = settings.with_api_token(token);
    }

    match &cli.command {
        Command::Send { block_ids, slash } => send(cli, &settings, block_ids, *slash).await,
        Command::Poll => poll(cli, &settings, store).await,
        Command::Run => watch(cli, &settings, store).await,
        Command::Validate => validate(&settings).await,
    }
}

fn task_service(settings: &Settings) -> Result<Arc<TodoistTaskService>, CliError> {
    let token = settings.api_token().ok_or(CliError::MissingApiToken)?;
    Ok(Arc::new(TodoistTaskService::new(token)?))
}

fn editor_host(cli: &Cli) -> Result<Arc<SiyuanEditorHost>, CliError> {
    let host = SiyuanEditorHost::new(cli.siyuan_url.as_str())?.with_token(cli.siyuan_token.clone());
    Ok(Arc::new(host))
}

fn poller(
    cli: &Cli,
    settings: &Settings,
    store: Arc<JsonFileSettingsStore>,
) -> Result<Poller, CliError> {
    let service = CompletionSyncService::new(
        editor_host(cli)?,
        task_service(settings)?,
        store,
        Arc::new(DefaultClock),
    );
    Ok(SyncPoller::new(service))
}

async fn send(
    cli: &Cli,
    settings: &Settings,
    block_ids: &[String],
    slash: bool,
) -> Result<(), CliError> {
    let trigger = if slash {
        ExportTrigger::SlashCommand
    } else {
        ExportTrigger::BlockMenu
    };
    let requests = block_ids
        .iter()
        .map(|raw| BlockId::new(raw).map(|id| ExportRequest::new(id).with_trigger(trigger)))
        .collect::<Result<Vec<_>, _>>()?;

    let service = ExportService::new(editor_host(cli)?, task_service(settings)?);
    let results = service.export_many(settings, requests).await;

    let total = results.len();
    let mut failed = 0;
    let mut stdout = io::stdout().lock();
    for (block_id, result) in results {
        match result {
            Ok(exported) => {
                writeln!(stdout, "{block_id}\t{}", exported.task().url())?;
                for warning in exported.warnings() {
                    writeln!(stdout, "{block_id}\twarning: {warning}")?;
                }
            }
            Err(err) => {
                failed += 1;
                error!(block_id = %block_id, error = %err, "export failed");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::ExportFailed { failed, total });
    }
    Ok(())
}

async fn poll(
    cli: &Cli,
    settings: &Settings,
    store: Arc<JsonFileSettingsStore>,
) -> Result<(), CliError> {
    let outcome = poller(cli, settings, store)?.poll_once().await;
    let line = match outcome {
        CycleOutcome::Skipped => "skipped: another cycle is running".to_owned(),
        CycleOutcome::ColdStart(cursor) => format!("initialised cursor at {cursor}"),
        CycleOutcome::Synced(summary) => format!(
            "completed {} block(s), skipped {} task(s), cursor now {}",
            summary.completed().len(),
            summary.skipped().len(),
            summary.window().until()
        ),
        CycleOutcome::Aborted(err) => return Err(err.into()),
    };
    writeln!(io::stdout().lock(), "{line}")?;
    Ok(())
}

async fn watch(
    cli: &Cli,
    settings: &Settings,
    store: Arc<JsonFileSettingsStore>,
) -> Result<(), CliError> {
    let poller = poller(cli, settings, store)?;
    poller.start(settings.sync_interval());
    tokio::signal::ctrl_c().await?;
    info!("interrupted, waiting for the running cycle to finish");
    poller.shutdown().await;
    Ok(())
}

async fn validate(settings: &Settings) -> Result<(), CliError> {
    if !task_service(settings)?.validate_credentials().await {
        return Err(CliError::InvalidCredentials);
    }
    writeln!(io::stdout().lock(), "API token accepted")?;
    Ok(())
}
