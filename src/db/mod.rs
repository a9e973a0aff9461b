use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

pub mod helpers;
mod migrations;
mod repositories;

use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// SQLite-backed implementation of both stores.
///
/// A single worker thread owns the connection; every store call is shipped to it as a closure
/// and runs to completion before the next one starts. That serializes individual calls but does
/// not make multi-call engine operations atomic.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("worktally-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Round-trips a trivial query through the worker thread.
    pub fn health_check(&self) -> Result<()> {
        let answer: i64 = self.execute(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get(0))
                .map_err(anyhow::Error::new)
        })?;

        if answer != 1 {
            return Err(anyhow!("health query returned {answer}, expected 1"));
        }
        Ok(())
    }

    /// Runs `task` on the worker thread and blocks until it replies.
    ///
    /// Must not be called from inside an async runtime.
    pub fn execute<F, T, E>(&self, task: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<anyhow::Error> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| E::from(anyhow!("failed to send command to DB thread: {err}")))?;

        reply_rx
            .blocking_recv()
            .map_err(|_| E::from(anyhow!("database thread terminated unexpectedly")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_directories_and_migrates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("worktally.sqlite3");
        let db = Database::new(path.clone()).unwrap();

        assert_eq!(db.path(), path.as_path());
        assert!(path.exists());

        let version: i32 = db
            .execute(|conn| {
                conn.pragma_query_value(None, "user_version", |row| row.get(0))
                    .map_err(anyhow::Error::new)
            })
            .unwrap();
        assert_eq!(version, migrations::CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn health_check_passes_on_fresh_database() {
        let temp = TempDir::new().unwrap();
        let db = Database::new(temp.path().join("worktally.sqlite3")).unwrap();

        db.health_check().unwrap();
        db.clone().health_check().unwrap();
    }

    #[test]
    fn task_errors_reach_the_caller() {
        let temp = TempDir::new().unwrap();
        let db = Database::new(temp.path().join("worktally.sqlite3")).unwrap();

        let result: Result<()> = db.execute(|_conn| Err(anyhow!("boom")));
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }
}
