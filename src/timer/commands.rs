//! String-typed entry points for front ends: ids arrive as text, errors leave as
//! `"CODE: message"` strings.

use uuid::Uuid;

use crate::{
    error::TrackerError,
    models::{Interval, TimeRecord},
    AppState,
};

pub(crate) fn parse_id(value: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|err| format!("INVALID_ID: {field} '{value}': {err}"))
}

pub(crate) fn describe(err: TrackerError) -> String {
    format!("{}: {}", err.code(), err)
}

pub fn start_timer(state: &AppState, task_id: &str) -> Result<Interval, String> {
    let task_id = parse_id(task_id, "task_id")?;
    state.timer.start(task_id).map_err(describe)
}

pub fn stop_timer(state: &AppState, interval_id: &str) -> Result<Interval, String> {
    let interval_id = parse_id(interval_id, "interval_id")?;
    state.timer.stop(interval_id).map_err(describe)
}

pub fn resume_timer(state: &AppState, task_id: &str, run_id: &str) -> Result<Interval, String> {
    let task_id = parse_id(task_id, "task_id")?;
    let run_id = parse_id(run_id, "run_id")?;
    state.timer.resume(task_id, run_id).map_err(describe)
}

pub fn get_interval(state: &AppState, interval_id: &str) -> Result<Interval, String> {
    let interval_id = parse_id(interval_id, "interval_id")?;
    state.timer.current(interval_id).map_err(describe)
}

pub fn discard_interval(state: &AppState, interval_id: &str) -> Result<(), String> {
    let interval_id = parse_id(interval_id, "interval_id")?;
    state.timer.discard(interval_id).map_err(describe)
}

pub fn list_run_intervals(state: &AppState, run_id: &str) -> Result<Vec<Interval>, String> {
    let run_id = parse_id(run_id, "run_id")?;
    state.timer.run_intervals(run_id).map_err(describe)
}

pub fn complete_run(state: &AppState, run_id: &str) -> Result<TimeRecord, String> {
    let run_id = parse_id(run_id, "run_id")?;
    state.timer.complete(run_id).map_err(describe)
}
