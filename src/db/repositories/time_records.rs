use anyhow::Result;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::{
    db::{
        helpers::{format_datetime, parse_datetime, parse_uuid},
        Database,
    },
    error::StoreError,
    models::TimeRecord,
    store::{RecordStore, StoreResult},
};

const SELECT_COLUMNS: &str =
    "SELECT id, run_id, task_id, delete_flag, started_at, ended_at, duration_ns FROM time_records";

fn row_to_record(row: &Row) -> Result<TimeRecord> {
    let id: String = row.get("id")?;
    let run_id: String = row.get("run_id")?;
    let task_id: String = row.get("task_id")?;
    let delete_flag: i64 = row.get("delete_flag")?;
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;

    Ok(TimeRecord {
        id: parse_uuid(&id, "id")?,
        run_id: parse_uuid(&run_id, "run_id")?,
        task_id: parse_uuid(&task_id, "task_id")?,
        deleted: delete_flag != 0,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_datetime(&ended_at, "ended_at")?,
        duration_ns: row.get("duration_ns")?,
    })
}

impl RecordStore for Database {
    fn create_record(&self, record: &TimeRecord) -> StoreResult<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO time_records (id, run_id, task_id, delete_flag, started_at, ended_at, duration_ns)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id.to_string(),
                    record.run_id.to_string(),
                    record.task_id.to_string(),
                    i64::from(record.deleted),
                    format_datetime(&record.started_at),
                    format_datetime(&record.ended_at),
                    record.duration_ns,
                ],
            )?;
            Ok(())
        })
    }

    fn find_record(&self, id: Uuid) -> StoreResult<TimeRecord> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;

            let mut rows = stmt.query(params![id.to_string()])?;
            match rows.next()? {
                Some(row) => Ok(row_to_record(row)?),
                None => Err(StoreError::not_found("time record", id)),
            }
        })
    }

    fn update_record(&self, record: &TimeRecord) -> StoreResult<()> {
        let record = record.clone();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE time_records
                 SET started_at = ?1,
                     ended_at = ?2,
                     duration_ns = ?3
                 WHERE id = ?4",
                params![
                    format_datetime(&record.started_at),
                    format_datetime(&record.ended_at),
                    record.duration_ns,
                    record.id.to_string(),
                ],
            )?;

            if rows_affected == 0 {
                return Err(StoreError::not_found("time record", record.id));
            }
            Ok(())
        })
    }

    fn list_records(&self, exclude_deleted: bool) -> StoreResult<Vec<TimeRecord>> {
        self.execute(move |conn| {
            let mut query = SELECT_COLUMNS.to_string();
            if exclude_deleted {
                query.push_str(" WHERE delete_flag = 0");
            }
            query.push_str(" ORDER BY started_at DESC, id ASC");

            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }

            Ok(records)
        })
    }

    fn find_records_by_run(&self, run_id: Uuid) -> StoreResult<Vec<TimeRecord>> {
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} WHERE run_id = ?1 ORDER BY rowid ASC"))?;

            let mut rows = stmt.query(params![run_id.to_string()])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }

            Ok(records)
        })
    }

    fn delete_record(&self, id: Uuid) -> StoreResult<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE time_records SET delete_flag = 1 WHERE id = ?1",
                params![id.to_string()],
            )?;

            if rows_affected == 0 {
                return Err(StoreError::not_found("time record", id));
            }
            Ok(())
        })
    }
}
