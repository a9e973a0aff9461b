use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{Result, TrackerError},
    log_info, log_warn,
    models::{Interval, TimeRecord},
    store::{RecordStore, SessionStore},
};

use super::summarize_run;

const ENABLE_LOGS: bool = true;

/// Opt-in guards for the two places where the default lifecycle trusts its caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingPolicy {
    /// Resume refuses a run id that has no intervals yet.
    pub verify_resume_run: bool,
    /// Complete refuses a run that already produced a record.
    pub unique_completion: bool,
}

/// Drives the interval lifecycle and run completion.
#[derive(Clone)]
pub struct TimerController {
    sessions: Arc<dyn SessionStore>,
    records: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    policy: TrackingPolicy,
}

impl TimerController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        policy: TrackingPolicy,
    ) -> Self {
        Self {
            sessions,
            records,
            clock,
            policy,
        }
    }

    /// Opens the first interval of a brand-new run.
    pub fn start(&self, task_id: Uuid) -> Result<Interval> {
        let interval = Interval::open(Uuid::new_v4(), task_id, self.clock.now());
        self.sessions.create_interval(&interval)?;

        log_info!(
            "Started run {} for task {} (interval {})",
            interval.run_id,
            task_id,
            interval.id
        );
        Ok(interval)
    }

    /// Opens another interval under an existing run.
    pub fn resume(&self, task_id: Uuid, run_id: Uuid) -> Result<Interval> {
        if self.policy.verify_resume_run
            && self.sessions.list_intervals_by_run(run_id)?.is_empty()
        {
            log_warn!("Refusing to resume unknown run {}", run_id);
            return Err(TrackerError::UnknownRun(run_id));
        }

        let interval = Interval::open(run_id, task_id, self.clock.now());
        self.sessions.create_interval(&interval)?;

        log_info!("Resumed run {} (interval {})", run_id, interval.id);
        Ok(interval)
    }

    /// Closes an open interval at the current instant and returns it.
    pub fn stop(&self, interval_id: Uuid) -> Result<Interval> {
        let mut interval = self.sessions.find_interval(interval_id)?;

        if let Err(err) = interval.close(self.clock.now()) {
            log_warn!("Rejected stop of interval {}: {}", interval_id, err);
            return Err(err);
        }
        self.sessions.update_interval(&interval)?;

        log_info!(
            "Stopped interval {} of run {} after {}s",
            interval.id,
            interval.run_id,
            interval.duration().num_seconds()
        );
        Ok(interval)
    }

    pub fn current(&self, interval_id: Uuid) -> Result<Interval> {
        Ok(self.sessions.find_interval(interval_id)?)
    }

    /// Throws away an interval that is still running. Closed intervals are history and stay.
    pub fn discard(&self, interval_id: Uuid) -> Result<()> {
        let interval = self.sessions.find_interval(interval_id)?;
        if !interval.is_open() {
            return Err(TrackerError::AlreadyClosed(interval_id));
        }

        self.sessions.delete_interval(interval_id)?;
        log_info!("Discarded open interval {} of run {}", interval_id, interval.run_id);
        Ok(())
    }

    pub fn run_intervals(&self, run_id: Uuid) -> Result<Vec<Interval>> {
        Ok(self.sessions.list_intervals_by_run(run_id)?)
    }

    /// Folds a fully stopped run into one new [`TimeRecord`].
    ///
    /// Nothing is written unless every check passes. Without `unique_completion`, completing
    /// the same run twice yields two records.
    pub fn complete(&self, run_id: Uuid) -> Result<TimeRecord> {
        if self.policy.unique_completion {
            if let Some(existing) = self.records.find_records_by_run(run_id)?.first() {
                log_warn!("Run {} already completed as {}", run_id, existing.id);
                return Err(TrackerError::AlreadyCompleted {
                    run_id,
                    record_id: existing.id,
                });
            }
        }

        let intervals = self.sessions.list_intervals_by_run(run_id)?;
        let record = match summarize_run(run_id, &intervals) {
            Ok(summary) => summary.into_record()?,
            Err(err) => {
                log_warn!("Cannot complete run {}: {}", run_id, err);
                return Err(err);
            }
        };

        self.records.create_record(&record)?;

        log_info!(
            "Completed run {} as record {} ({} intervals, {}s)",
            run_id,
            record.id,
            intervals.len(),
            record.duration().num_seconds()
        );
        Ok(record)
    }
}
