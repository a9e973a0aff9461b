use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::TimeRecord,
    timer::commands::{describe, parse_id},
    AppState,
};

/// New time fields for an existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEdit {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Defaults to `ended_at - started_at` when omitted.
    pub duration_ns: Option<i64>,
}

pub fn list_records(state: &AppState) -> Result<Vec<TimeRecord>, String> {
    state.records.list().map_err(describe)
}

pub fn get_record(state: &AppState, record_id: &str) -> Result<TimeRecord, String> {
    let record_id = parse_id(record_id, "record_id")?;
    state.records.get(record_id).map_err(describe)
}

pub fn update_record(
    state: &AppState,
    record_id: &str,
    edit: RecordEdit,
) -> Result<TimeRecord, String> {
    let record_id = parse_id(record_id, "record_id")?;
    let mut record = state.records.get(record_id).map_err(describe)?;

    let duration_ns = match edit.duration_ns {
        Some(ns) => ns,
        None => (edit.ended_at - edit.started_at)
            .num_nanoseconds()
            .ok_or_else(|| "DURATION_OVERFLOW: edited span is too long".to_string())?,
    };

    record.started_at = edit.started_at;
    record.ended_at = edit.ended_at;
    record.duration_ns = duration_ns;

    state.records.update(&record).map_err(describe)?;
    Ok(record)
}

pub fn delete_record(state: &AppState, record_id: &str) -> Result<(), String> {
    let record_id = parse_id(record_id, "record_id")?;
    state.records.delete(record_id).map_err(describe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        timer::{commands::complete_run, commands::start_timer, commands::stop_timer, TrackingPolicy},
    };
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;
    use uuid::Uuid;

    fn completed_record() -> (AppState, TimeRecord) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        ));
        let state = AppState::in_memory(clock.clone(), TrackingPolicy::default());

        let interval = start_timer(&state, &Uuid::new_v4().to_string()).unwrap();
        clock.advance(TimeDelta::minutes(40));
        stop_timer(&state, &interval.id.to_string()).unwrap();
        let record = complete_run(&state, &interval.run_id.to_string()).unwrap();
        (state, record)
    }

    #[test]
    fn update_without_duration_uses_span() {
        let (state, record) = completed_record();
        let edit = RecordEdit {
            started_at: record.started_at,
            ended_at: record.started_at + TimeDelta::minutes(90),
            duration_ns: None,
        };

        let updated = update_record(&state, &record.id.to_string(), edit).unwrap();
        assert_eq!(updated.duration(), TimeDelta::minutes(90));
        assert_eq!(get_record(&state, &record.id.to_string()).unwrap(), updated);
    }

    #[test]
    fn update_rejects_span_too_long_for_nanoseconds() {
        let (state, record) = completed_record();
        let edit = RecordEdit {
            started_at: Utc.with_ymd_and_hms(1800, 1, 1, 0, 0, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap(),
            duration_ns: None,
        };

        let err = update_record(&state, &record.id.to_string(), edit).unwrap_err();
        assert!(err.starts_with("DURATION_OVERFLOW: "));
        assert_eq!(get_record(&state, &record.id.to_string()).unwrap(), record);
    }

    #[test]
    fn delete_hides_from_listing() {
        let (state, record) = completed_record();
        let id = record.id.to_string();

        assert_eq!(list_records(&state).unwrap().len(), 1);
        delete_record(&state, &id).unwrap();
        assert!(list_records(&state).unwrap().is_empty());
        assert!(get_record(&state, &id).unwrap().deleted);
    }

    #[test]
    fn unknown_record_reports_not_found() {
        let (state, _record) = completed_record();
        let err = delete_record(&state, &Uuid::new_v4().to_string()).unwrap_err();
        assert!(err.starts_with("NOT_FOUND: "));
    }
}
