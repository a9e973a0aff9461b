//! Storage contracts consumed by the timer controller and record service.
//!
//! Each call is expected to be atomic on its own. Nothing here spans calls, so an engine
//! operation that reads and then writes can interleave with another caller's writes.

pub mod memory;

use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Interval, TimeRecord},
};

pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait SessionStore: Send + Sync {
    fn create_interval(&self, interval: &Interval) -> StoreResult<()>;

    fn find_interval(&self, id: Uuid) -> StoreResult<Interval>;

    /// Overwrites every mutable column of an existing interval.
    fn update_interval(&self, interval: &Interval) -> StoreResult<()>;

    /// All intervals of a run ordered by `started_at` ascending, ties broken by id.
    fn list_intervals_by_run(&self, run_id: Uuid) -> StoreResult<Vec<Interval>>;

    fn delete_interval(&self, id: Uuid) -> StoreResult<()>;
}

pub trait RecordStore: Send + Sync {
    fn create_record(&self, record: &TimeRecord) -> StoreResult<()>;

    /// Returns the record even when it has been logically deleted.
    fn find_record(&self, id: Uuid) -> StoreResult<TimeRecord>;

    /// Overwrites `started_at`, `ended_at` and `duration_ns`; other fields are ignored.
    fn update_record(&self, record: &TimeRecord) -> StoreResult<()>;

    /// Records ordered by `started_at` descending, ties broken by id.
    fn list_records(&self, exclude_deleted: bool) -> StoreResult<Vec<TimeRecord>>;

    /// Records produced for `run_id`, oldest first. Includes logically deleted ones.
    fn find_records_by_run(&self, run_id: Uuid) -> StoreResult<Vec<TimeRecord>>;

    /// Logical deletion: sets the flag and keeps the row.
    fn delete_record(&self, id: Uuid) -> StoreResult<()>;
}
