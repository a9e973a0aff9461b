use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{
    error::{Result, TrackerError},
    models::{Interval, TimeRecord},
};

/// Totals of a fully stopped run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub task_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration: TimeDelta,
}

impl RunSummary {
    /// Materializes the summary as a new, visible record with a fresh id.
    pub fn into_record(self) -> Result<TimeRecord> {
        let duration_ns = self
            .duration
            .num_nanoseconds()
            .ok_or(TrackerError::DurationOverflow(self.run_id))?;

        Ok(TimeRecord {
            id: Uuid::new_v4(),
            run_id: self.run_id,
            task_id: self.task_id,
            deleted: false,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_ns,
        })
    }
}

/// Folds every interval of a run into one summary.
///
/// Task and start come from the earliest interval. The end is the latest end across the run,
/// which need not belong to the last-started interval because intervals may overlap. Overlaps
/// are counted twice in `duration`.
pub fn summarize_run(run_id: Uuid, intervals: &[Interval]) -> Result<RunSummary> {
    let first = intervals
        .iter()
        .min_by_key(|interval| (interval.started_at, interval.id))
        .ok_or(TrackerError::EmptyRun(run_id))?;

    let mut ended_at = first.started_at;
    let mut duration = TimeDelta::zero();

    for interval in intervals {
        let Some(interval_end) = interval.ended_at else {
            return Err(TrackerError::OpenIntervalExists {
                run_id,
                interval_id: interval.id,
            });
        };

        duration = duration
            .checked_add(&interval.duration())
            .ok_or(TrackerError::DurationOverflow(run_id))?;
        ended_at = ended_at.max(interval_end);
    }

    Ok(RunSummary {
        run_id,
        task_id: first.task_id,
        started_at: first.started_at,
        ended_at,
        duration,
    })
}
