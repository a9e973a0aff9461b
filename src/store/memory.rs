use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use uuid::Uuid;

use super::{RecordStore, SessionStore, StoreResult};
use crate::{
    error::StoreError,
    models::{Interval, TimeRecord},
};

#[derive(Default)]
struct Tables {
    intervals: HashMap<Uuid, Interval>,
    records: HashMap<Uuid, TimeRecord>,
    // Insertion order, used to keep `find_records_by_run` oldest-first.
    record_order: Vec<Uuid>,
}

/// Process-local implementation of both stores.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn create_interval(&self, interval: &Interval) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.intervals.contains_key(&interval.id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "interval {} already exists",
                interval.id
            )));
        }
        tables.intervals.insert(interval.id, interval.clone());
        Ok(())
    }

    fn find_interval(&self, id: Uuid) -> StoreResult<Interval> {
        self.tables()
            .intervals
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("interval", id))
    }

    fn update_interval(&self, interval: &Interval) -> StoreResult<()> {
        let mut tables = self.tables();
        match tables.intervals.get_mut(&interval.id) {
            Some(existing) => {
                *existing = interval.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("interval", interval.id)),
        }
    }

    fn list_intervals_by_run(&self, run_id: Uuid) -> StoreResult<Vec<Interval>> {
        let mut intervals: Vec<Interval> = self
            .tables()
            .intervals
            .values()
            .filter(|interval| interval.run_id == run_id)
            .cloned()
            .collect();
        intervals.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        Ok(intervals)
    }

    fn delete_interval(&self, id: Uuid) -> StoreResult<()> {
        match self.tables().intervals.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found("interval", id)),
        }
    }
}

impl RecordStore for MemoryStore {
    fn create_record(&self, record: &TimeRecord) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.records.contains_key(&record.id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "time record {} already exists",
                record.id
            )));
        }
        tables.records.insert(record.id, record.clone());
        tables.record_order.push(record.id);
        Ok(())
    }

    fn find_record(&self, id: Uuid) -> StoreResult<TimeRecord> {
        self.tables()
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("time record", id))
    }

    fn update_record(&self, record: &TimeRecord) -> StoreResult<()> {
        let mut tables = self.tables();
        match tables.records.get_mut(&record.id) {
            Some(existing) => {
                existing.started_at = record.started_at;
                existing.ended_at = record.ended_at;
                existing.duration_ns = record.duration_ns;
                Ok(())
            }
            None => Err(StoreError::not_found("time record", record.id)),
        }
    }

    fn list_records(&self, exclude_deleted: bool) -> StoreResult<Vec<TimeRecord>> {
        let mut records: Vec<TimeRecord> = self
            .tables()
            .records
            .values()
            .filter(|record| !(exclude_deleted && record.deleted))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    fn find_records_by_run(&self, run_id: Uuid) -> StoreResult<Vec<TimeRecord>> {
        let tables = self.tables();
        Ok(tables
            .record_order
            .iter()
            .filter_map(|id| tables.records.get(id))
            .filter(|record| record.run_id == run_id)
            .cloned()
            .collect())
    }

    fn delete_record(&self, id: Uuid) -> StoreResult<()> {
        match self.tables().records.get_mut(&id) {
            Some(record) => {
                record.deleted = true;
                Ok(())
            }
            None => Err(StoreError::not_found("time record", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    fn record(started_at: DateTime<Utc>) -> TimeRecord {
        TimeRecord {
            id: Uuid::new_v4(),
            run_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            deleted: false,
            started_at,
            ended_at: started_at,
            duration_ns: 0,
        }
    }

    #[test]
    fn run_listing_is_start_ascending() {
        let store = MemoryStore::new();
        let run_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let late = Interval::open(run_id, task_id, at(11, 0));
        let early = Interval::open(run_id, task_id, at(9, 0));
        let other_run = Interval::open(Uuid::new_v4(), task_id, at(10, 0));

        for interval in [&late, &early, &other_run] {
            store.create_interval(interval).unwrap();
        }

        let listed = store.list_intervals_by_run(run_id).unwrap();
        assert_eq!(listed, vec![early, late]);
    }

    #[test]
    fn update_of_missing_interval_is_not_found() {
        let store = MemoryStore::new();
        let interval = Interval::open(Uuid::new_v4(), Uuid::new_v4(), at(9, 0));
        let err = store.update_interval(&interval).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn list_hides_deleted_records_only_when_asked() {
        let store = MemoryStore::new();
        let older = record(at(8, 0));
        let newer = record(at(12, 0));
        store.create_record(&older).unwrap();
        store.create_record(&newer).unwrap();
        store.delete_record(newer.id).unwrap();

        let visible = store.list_records(true).unwrap();
        assert_eq!(visible.iter().map(|r| r.id).collect::<Vec<_>>(), vec![older.id]);

        let all = store.list_records(false).unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);
        assert!(store.find_record(newer.id).unwrap().deleted);
    }
}
