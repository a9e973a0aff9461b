use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::timer::TrackingPolicy;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DATABASE_FILE: &str = "worktally.sqlite3";
const DEFAULT_DATA_DIR: &str = ".worktally";

const HOME_VAR: &str = "WORKTALLY_HOME";
const DB_VAR: &str = "WORKTALLY_DB";
const DEBUG_VAR: &str = "WORKTALLY_DEBUG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Relative paths resolve against the data directory.
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub policy: TrackingPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".into(),
            policy: TrackingPolicy::default(),
        }
    }
}

/// `settings.json` on disk plus its in-memory copy.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
    load_error: Option<String>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut load_error = None;
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                let message = format!("malformed settings in {}: {err}", path.display());
                warn!("Ignoring {message}; using defaults");
                load_error = Some(message);
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
            load_error,
        })
    }

    /// Why the file on disk was replaced by defaults, if it was.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> Settings {
        self.read().clone()
    }

    pub fn update_policy(&self, policy: TrackingPolicy) -> Result<()> {
        let mut guard = self.write();
        guard.policy = policy;
        self.persist(&guard)
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Settings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Settings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Process environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// `WORKTALLY_HOME`
    pub home: Option<PathBuf>,
    /// `WORKTALLY_DB`
    pub database: Option<PathBuf>,
    /// `WORKTALLY_DEBUG`
    pub debug: bool,
}

impl Environment {
    /// Reads only the variables above; the rest of the environment may hold anything.
    pub fn from_env() -> Self {
        Self::from_vars(
            [HOME_VAR, DB_VAR, DEBUG_VAR]
                .into_iter()
                .filter_map(|key| std::env::var_os(key).map(|value| (key, value))),
        )
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OsString>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            let value: OsString = value.into();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                HOME_VAR => env.home = Some(PathBuf::from(value)),
                DB_VAR => env.database = Some(PathBuf::from(value)),
                DEBUG_VAR => {
                    env.debug = value
                        .to_str()
                        .is_some_and(|flag| flag == "1" || flag.eq_ignore_ascii_case("true"))
                }
                _ => {}
            }
        }
        env
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

/// Settings merged with environment overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub database_path: PathBuf,
    pub log_level: LevelFilter,
    pub policy: TrackingPolicy,
}

impl ResolvedConfig {
    pub fn resolve(settings: &Settings, env: &Environment) -> Self {
        let data_dir = env.data_dir();
        let database_path = match (&env.database, &settings.database_path) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) if path.is_absolute() => path.clone(),
            (None, Some(path)) => data_dir.join(path),
            (None, None) => data_dir.join(DATABASE_FILE),
        };

        let log_level = if env.debug {
            LevelFilter::Debug
        } else {
            settings.log_level.parse().unwrap_or_else(|_| {
                warn!("Unknown log level '{}'; using info", settings.log_level);
                LevelFilter::Info
            })
        };

        Self {
            database_path,
            log_level,
            policy: settings.policy,
        }
    }
}
