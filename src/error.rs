use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a storage adapter.
///
/// Adapters keep "the key does not resolve" apart from every other I/O problem so the engines
/// can surface `NotFound` to callers instead of an opaque storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        StoreError::NotFound { entity, id }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("interval {0} is already closed")]
    AlreadyClosed(Uuid),

    #[error("stop time {stopped_at} precedes start time {started_at} of interval {interval_id}")]
    InvalidTimeOrder {
        interval_id: Uuid,
        started_at: DateTime<Utc>,
        stopped_at: DateTime<Utc>,
    },

    #[error("run {0} has no intervals")]
    EmptyRun(Uuid),

    #[error("run {run_id} still has open interval {interval_id}; stop it before completing")]
    OpenIntervalExists { run_id: Uuid, interval_id: Uuid },

    #[error("run {run_id} was already completed as record {record_id}")]
    AlreadyCompleted { run_id: Uuid, record_id: Uuid },

    #[error("run {0} has no prior intervals to resume")]
    UnknownRun(Uuid),

    #[error("total duration of run {0} overflows")]
    DurationOverflow(Uuid),

    #[error("storage failure: {0:#}")]
    StorageFailure(#[source] anyhow::Error),
}

impl TrackerError {
    /// Stable machine-readable code for front ends.
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::NotFound { .. } => "NOT_FOUND",
            TrackerError::AlreadyClosed(_) => "ALREADY_CLOSED",
            TrackerError::InvalidTimeOrder { .. } => "INVALID_TIME_ORDER",
            TrackerError::EmptyRun(_) => "EMPTY_RUN",
            TrackerError::OpenIntervalExists { .. } => "OPEN_INTERVAL_EXISTS",
            TrackerError::AlreadyCompleted { .. } => "ALREADY_COMPLETED",
            TrackerError::UnknownRun(_) => "UNKNOWN_RUN",
            TrackerError::DurationOverflow(_) => "DURATION_OVERFLOW",
            TrackerError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => TrackerError::NotFound { entity, id },
            StoreError::Backend(source) => TrackerError::StorageFailure(source),
        }
    }
}

// Front ends receive `{ "code": ..., "message": ... }`.
impl Serialize for TrackerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("TrackerError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_tracker_not_found() {
        let id = Uuid::new_v4();
        let err: TrackerError = StoreError::not_found("interval", id).into();
        assert!(matches!(err, TrackerError::NotFound { entity: "interval", id: got } if got == id));
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn backend_failure_maps_to_storage_failure() {
        let err: TrackerError = StoreError::Backend(anyhow::anyhow!("disk full")).into();
        assert_eq!(err.code(), "STORAGE_FAILURE");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn serializes_code_and_message() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(TrackerError::EmptyRun(id)).unwrap();
        assert_eq!(json["code"], "EMPTY_RUN");
        assert_eq!(json["message"], format!("run {id} has no intervals"));
    }
}
