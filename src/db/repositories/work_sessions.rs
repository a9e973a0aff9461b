use anyhow::Result;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::{
    db::{
        helpers::{format_datetime, parse_datetime, parse_optional_datetime, parse_uuid},
        Database,
    },
    error::StoreError,
    models::Interval,
    store::{SessionStore, StoreResult},
};

fn row_to_interval(row: &Row) -> Result<Interval> {
    let id: String = row.get("id")?;
    let run_id: String = row.get("run_id")?;
    let task_id: String = row.get("task_id")?;
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;

    Ok(Interval {
        id: parse_uuid(&id, "id")?,
        run_id: parse_uuid(&run_id, "run_id")?,
        task_id: parse_uuid(&task_id, "task_id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
    })
}

impl SessionStore for Database {
    fn create_interval(&self, interval: &Interval) -> StoreResult<()> {
        let record = interval.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO work_sessions (id, run_id, task_id, started_at, ended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.to_string(),
                    record.run_id.to_string(),
                    record.task_id.to_string(),
                    format_datetime(&record.started_at),
                    record.ended_at.as_ref().map(format_datetime),
                ],
            )?;
            Ok(())
        })
    }

    fn find_interval(&self, id: Uuid) -> StoreResult<Interval> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, run_id, task_id, started_at, ended_at
                 FROM work_sessions
                 WHERE id = ?1",
            )?;

            let mut rows = stmt.query(params![id.to_string()])?;
            match rows.next()? {
                Some(row) => Ok(row_to_interval(row)?),
                None => Err(StoreError::not_found("interval", id)),
            }
        })
    }

    fn update_interval(&self, interval: &Interval) -> StoreResult<()> {
        let record = interval.clone();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE work_sessions
                 SET run_id = ?1,
                     task_id = ?2,
                     started_at = ?3,
                     ended_at = ?4
                 WHERE id = ?5",
                params![
                    record.run_id.to_string(),
                    record.task_id.to_string(),
                    format_datetime(&record.started_at),
                    record.ended_at.as_ref().map(format_datetime),
                    record.id.to_string(),
                ],
            )?;

            if rows_affected == 0 {
                return Err(StoreError::not_found("interval", record.id));
            }
            Ok(())
        })
    }

    fn list_intervals_by_run(&self, run_id: Uuid) -> StoreResult<Vec<Interval>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, run_id, task_id, started_at, ended_at
                 FROM work_sessions
                 WHERE run_id = ?1
                 ORDER BY started_at ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![run_id.to_string()])?;
            let mut intervals = Vec::new();
            while let Some(row) = rows.next()? {
                intervals.push(row_to_interval(row)?);
            }

            Ok(intervals)
        })
    }

    fn delete_interval(&self, id: Uuid) -> StoreResult<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM work_sessions WHERE id = ?1",
                params![id.to_string()],
            )?;

            if rows_affected == 0 {
                return Err(StoreError::not_found("interval", id));
            }
            Ok(())
        })
    }
}
