use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TrackerError};

/// One contiguous start/stop span of work on a task.
///
/// Intervals sharing a `run_id` belong to the same measurement run. `ended_at` is `None` while
/// the interval is running and can be set exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub id: Uuid,
    pub run_id: Uuid,
    pub task_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Interval {
    /// A fresh open interval with a newly generated id.
    pub fn open(run_id: Uuid, task_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            task_id,
            started_at,
            ended_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Closes the interval at `now`. Leaves `self` untouched on error.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_open() {
            return Err(TrackerError::AlreadyClosed(self.id));
        }
        if now < self.started_at {
            return Err(TrackerError::InvalidTimeOrder {
                interval_id: self.id,
                started_at: self.started_at,
                stopped_at: now,
            });
        }

        self.ended_at = Some(now);
        Ok(())
    }

    /// Elapsed time of a closed interval; zero while open.
    pub fn duration(&self) -> TimeDelta {
        match self.ended_at {
            Some(ended_at) => ended_at - self.started_at,
            None => TimeDelta::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    fn running_since(start: DateTime<Utc>) -> Interval {
        Interval::open(Uuid::new_v4(), Uuid::new_v4(), start)
    }

    #[test]
    fn open_interval_has_zero_duration() {
        let interval = running_since(at(10, 0));
        assert!(interval.is_open());
        assert_eq!(interval.duration(), TimeDelta::zero());
    }

    #[test]
    fn close_sets_end_and_duration() {
        let mut interval = running_since(at(10, 0));
        interval.close(at(10, 30)).unwrap();

        assert!(!interval.is_open());
        assert_eq!(interval.ended_at, Some(at(10, 30)));
        assert_eq!(interval.duration(), TimeDelta::minutes(30));
    }

    #[test]
    fn close_at_start_instant_is_allowed() {
        let mut interval = running_since(at(10, 0));
        interval.close(at(10, 0)).unwrap();
        assert_eq!(interval.duration(), TimeDelta::zero());
    }

    #[test]
    fn close_twice_is_rejected_every_time() {
        let mut interval = running_since(at(10, 0));
        interval.close(at(10, 5)).unwrap();

        for minute in [6, 7, 8] {
            let err = interval.close(at(10, minute)).unwrap_err();
            assert!(matches!(err, TrackerError::AlreadyClosed(id) if id == interval.id));
        }
        assert_eq!(interval.ended_at, Some(at(10, 5)));
    }

    #[test]
    fn close_before_start_is_rejected_and_stays_open() {
        let mut interval = running_since(at(10, 0));
        let err = interval.close(at(9, 59)).unwrap_err();

        assert!(matches!(err, TrackerError::InvalidTimeOrder { .. }));
        assert!(interval.is_open());
    }
}
