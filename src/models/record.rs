use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable summary of a completed run.
///
/// `duration_ns` is the sum of the run's interval durations, which can be shorter than
/// `ended_at - started_at` when the run had gaps between intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    pub id: Uuid,
    pub run_id: Uuid,
    pub task_id: Uuid,
    pub deleted: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ns: i64,
}

impl TimeRecord {
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.duration_ns)
    }
}
