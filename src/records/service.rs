use std::sync::Arc;

use uuid::Uuid;

use crate::{error::Result, log_info, models::TimeRecord, store::RecordStore};

const ENABLE_LOGS: bool = true;

/// Read, edit and hide completed time records.
#[derive(Clone)]
pub struct RecordService {
    records: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Visible records, most recent start first.
    pub fn list(&self) -> Result<Vec<TimeRecord>> {
        Ok(self.records.list_records(true)?)
    }

    /// Also resolves logically deleted records.
    pub fn get(&self, id: Uuid) -> Result<TimeRecord> {
        Ok(self.records.find_record(id)?)
    }

    /// Overwrites the time fields with caller-supplied values. They are not re-checked against
    /// the run's intervals.
    pub fn update(&self, record: &TimeRecord) -> Result<()> {
        self.records.update_record(record)?;
        log_info!("Updated time record {}", record.id);
        Ok(())
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.records.delete_record(id)?;
        log_info!("Hid time record {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::TrackerError, store::MemoryStore};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap()
    }

    fn seeded(starts: &[u32]) -> (RecordService, Vec<TimeRecord>) {
        let store = Arc::new(MemoryStore::new());
        let mut created = Vec::new();
        for hour in starts {
            let record = TimeRecord {
                id: Uuid::new_v4(),
                run_id: Uuid::new_v4(),
                task_id: Uuid::new_v4(),
                deleted: false,
                started_at: at(*hour),
                ended_at: at(*hour) + TimeDelta::minutes(30),
                duration_ns: TimeDelta::minutes(30).num_nanoseconds().unwrap(),
            };
            store.create_record(&record).unwrap();
            created.push(record);
        }
        (RecordService::new(store), created)
    }

    #[test]
    fn list_is_most_recent_first() {
        let (service, created) = seeded(&[9, 14, 11]);
        let ids: Vec<Uuid> = service.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![created[1].id, created[2].id, created[0].id]);
    }

    #[test]
    fn deleted_record_is_hidden_but_retrievable() {
        let (service, created) = seeded(&[9, 10]);
        let target = created[0].id;

        service.delete(target).unwrap();

        assert!(service.list().unwrap().iter().all(|r| r.id != target));
        let fetched = service.get(target).unwrap();
        assert!(fetched.deleted);
        assert_eq!(fetched.duration(), TimeDelta::minutes(30));
    }

    #[test]
    fn update_trusts_caller_values() {
        let (service, created) = seeded(&[9]);
        let mut edited = created[0].clone();
        // Deliberately inconsistent with the span; the service stores it as given.
        edited.duration_ns = TimeDelta::hours(5).num_nanoseconds().unwrap();
        edited.ended_at = at(8);

        service.update(&edited).unwrap();
        assert_eq!(service.get(edited.id).unwrap(), edited);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (service, created) = seeded(&[]);
        assert!(created.is_empty());
        let id = Uuid::new_v4();

        assert!(matches!(service.get(id), Err(TrackerError::NotFound { .. })));
        assert!(matches!(service.delete(id), Err(TrackerError::NotFound { .. })));
    }
}
