mod cli;
pub mod clock;
pub mod db;
pub mod error;
pub mod models;
pub mod records;
pub mod settings;
pub mod store;
pub mod timer;
mod utils;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use clap::Parser;
use log::{info, warn, LevelFilter};

use clock::{Clock, SystemClock};
use db::Database;
use records::RecordService;
use settings::{Environment, ResolvedConfig, SettingsStore, SETTINGS_FILE};
use store::{MemoryStore, RecordStore, SessionStore};
use timer::{TimerController, TrackingPolicy};

pub use error::{StoreError, TrackerError};
pub use models::{Interval, TimeRecord};

/// Until settings are read, only problems with reading them get through.
const BOOTSTRAP_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

/// Engines wired to one pair of stores.
pub struct AppState {
    pub timer: TimerController,
    pub records: RecordService,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        policy: TrackingPolicy,
    ) -> Self {
        Self {
            timer: TimerController::new(sessions, records.clone(), clock, policy),
            records: RecordService::new(records),
        }
    }

    /// Both stores backed by one SQLite file.
    pub fn open(db_path: &Path, policy: TrackingPolicy) -> anyhow::Result<Self> {
        let database = Arc::new(
            Database::new(db_path.to_path_buf())
                .with_context(|| format!("failed to open database {}", db_path.display()))?,
        );
        Ok(Self::new(
            database.clone(),
            database,
            Arc::new(SystemClock),
            policy,
        ))
    }

    /// Both stores held in process memory; nothing survives the process.
    pub fn in_memory(clock: Arc<dyn Clock>, policy: TrackingPolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, clock, policy)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Loaded first so RUST_LOG and WORKTALLY_* may come from it.
    let dotenv = dotenvy::dotenv();
    let env = Environment::from_env();
    utils::logging::init(BOOTSTRAP_LOG_LEVEL);

    if let Err(err) = dotenv {
        if !matches!(err, dotenvy::Error::Io(_)) {
            warn!("Failed to load .env file: {err}");
        }
    }

    let settings_path = args
        .config
        .clone()
        .unwrap_or_else(|| env.data_dir().join(SETTINGS_FILE));
    let settings = SettingsStore::new(settings_path)?;
    let config = ResolvedConfig::resolve(&settings.settings(), &env);

    utils::logging::set_level(config.log_level);
    info!("worktally starting up...");

    cli::execute(args, &settings, &config)
}
