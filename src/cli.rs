use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::{
    clock::SystemClock,
    db::Database,
    records::commands::{delete_record, get_record, list_records, update_record, RecordEdit},
    settings::{ResolvedConfig, SettingsStore},
    timer::commands::{
        complete_run, discard_interval, get_interval, list_run_intervals, resume_timer,
        start_timer, stop_timer,
    },
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "worktally", version, about = "Track work time per task in stop/resume runs")]
pub struct Cli {
    /// Settings file (defaults to <data dir>/settings.json)
    #[arg(long, global = true, env = "WORKTALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep everything in memory instead of the SQLite database
    #[arg(long, global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Track(TrackCommand),
    /// Inspect or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Check that the database answers queries
    Health,
}

#[derive(Debug, Subcommand)]
pub enum TrackCommand {
    /// Start a new run for a task
    Start { task_id: String },
    /// Stop a running interval
    Stop { interval_id: String },
    /// Open another interval under an existing run
    Resume { task_id: String, run_id: String },
    /// Show one interval
    Current { interval_id: String },
    /// Drop an interval that is still running
    Discard { interval_id: String },
    /// List the intervals of a run
    Run { run_id: String },
    /// Fold a fully stopped run into a time record
    Complete { run_id: String },
    /// List visible time records, newest first
    List,
    /// Show one time record, including hidden ones
    Get { record_id: String },
    /// Overwrite the times of a record
    Update {
        record_id: String,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
        /// Defaults to end - start
        #[arg(long)]
        duration_secs: Option<i64>,
    },
    /// Hide a record from listings
    Delete { record_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Change the tracking policy
    SetPolicy {
        #[arg(long, action = ArgAction::Set)]
        verify_resume_run: Option<bool>,
        #[arg(long, action = ArgAction::Set)]
        unique_completion: Option<bool>,
    },
}

pub fn execute(args: Cli, settings: &SettingsStore, config: &ResolvedConfig) -> Result<()> {
    match args.command {
        Command::Config(action) => execute_config(action, settings, config),
        Command::Health => execute_health(args.in_memory, config),
        Command::Track(command) => {
            let state = if args.in_memory {
                AppState::in_memory(Arc::new(SystemClock), config.policy)
            } else {
                AppState::open(&config.database_path, config.policy)?
            };
            execute_tracking(command, &state)
        }
    }
}

fn execute_tracking(command: TrackCommand, state: &AppState) -> Result<()> {
    match command {
        TrackCommand::Start { task_id } => print(start_timer(state, &task_id)),
        TrackCommand::Stop { interval_id } => print(stop_timer(state, &interval_id)),
        TrackCommand::Resume { task_id, run_id } => print(resume_timer(state, &task_id, &run_id)),
        TrackCommand::Current { interval_id } => print(get_interval(state, &interval_id)),
        TrackCommand::Discard { interval_id } => print(
            discard_interval(state, &interval_id).map(|()| json!({ "discarded": interval_id })),
        ),
        TrackCommand::Run { run_id } => print(list_run_intervals(state, &run_id)),
        TrackCommand::Complete { run_id } => print(complete_run(state, &run_id)),
        TrackCommand::List => print(list_records(state)),
        TrackCommand::Get { record_id } => print(get_record(state, &record_id)),
        TrackCommand::Update {
            record_id,
            start,
            end,
            duration_secs,
        } => {
            let duration_ns = duration_secs
                .map(|secs| {
                    secs.checked_mul(1_000_000_000)
                        .ok_or_else(|| anyhow!("--duration-secs {secs} is out of range"))
                })
                .transpose()?;
            let edit = RecordEdit {
                started_at: start,
                ended_at: end,
                duration_ns,
            };
            print(update_record(state, &record_id, edit))
        }
        TrackCommand::Delete { record_id } => print(
            delete_record(state, &record_id).map(|()| json!({ "deleted": record_id })),
        ),
    }
}

fn execute_health(in_memory: bool, config: &ResolvedConfig) -> Result<()> {
    if in_memory {
        return print::<_, String>(Ok(json!({ "status": "ok", "backend": "memory" })));
    }

    let database = Database::new(config.database_path.clone())?;
    database
        .health_check()
        .with_context(|| format!("database {} is unhealthy", database.path().display()))?;
    print::<_, String>(Ok(json!({
        "status": "ok",
        "backend": "sqlite",
        "databasePath": database.path(),
    })))
}

fn execute_config(
    action: ConfigCommand,
    settings: &SettingsStore,
    config: &ResolvedConfig,
) -> Result<()> {
    match action {
        ConfigCommand::Show => print::<_, String>(Ok(json!({
            "settingsPath": settings.path(),
            "databasePath": config.database_path,
            "logLevel": config.log_level.to_string(),
            "policy": config.policy,
        }))),
        ConfigCommand::SetPolicy {
            verify_resume_run,
            unique_completion,
        } => {
            let mut policy = settings.settings().policy;
            if let Some(value) = verify_resume_run {
                policy.verify_resume_run = value;
            }
            if let Some(value) = unique_completion {
                policy.unique_completion = value;
            }
            settings.update_policy(policy)?;
            print::<_, String>(Ok(policy))
        }
    }
}

fn print<T: Serialize, E: std::fmt::Display>(result: std::result::Result<T, E>) -> Result<()> {
    let value = result.map_err(|err| anyhow!("{err}"))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
