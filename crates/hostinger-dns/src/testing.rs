//! In-memory provider and observer used by unit tests

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::{ApiError, DnsRecord, RecordFilter, RecordSet, ZoneApi, TXT};
use crate::observer::{ChallengeEvent, ChallengeObserver};

/// A provider call as seen by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        zone: String,
    },
    Update {
        zone: String,
        record_set: RecordSet,
        overwrite: bool,
    },
    Delete {
        zone: String,
        filters: Vec<RecordFilter>,
    },
}

/// Stub provider holding a single zone's records in memory
#[derive(Default)]
pub struct StubZoneApi {
    records: Mutex<Vec<DnsRecord>>,
    calls: Mutex<Vec<Call>>,
    fail_list: AtomicBool,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
}

impl StubZoneApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let stub = Self::default();
        *stub.records.lock() = records;
        stub
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().clone()
    }

    pub fn txt_records(&self, name: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.matches(name, TXT))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ZoneApi for StubZoneApi {
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>, ApiError> {
        self.calls.lock().push(Call::List {
            zone: zone.to_string(),
        });
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::Request("Simulated list failure".into()));
        }
        Ok(self.records())
    }

    async fn update_records(
        &self,
        zone: &str,
        record_set: RecordSet,
        overwrite: bool,
    ) -> Result<(), ApiError> {
        self.calls.lock().push(Call::Update {
            zone: zone.to_string(),
            record_set: record_set.clone(),
            overwrite,
        });
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 422,
                message: "Simulated update failure".into(),
            });
        }

        let mut records = self.records.lock();
        if overwrite {
            records.clear();
        }
        records.extend(record_set.values.iter().map(|content| DnsRecord {
            name: record_set.name.clone(),
            record_type: record_set.record_type.clone(),
            content: content.clone(),
            ttl: record_set.ttl,
        }));
        Ok(())
    }

    async fn delete_records(
        &self,
        zone: &str,
        filters: Vec<RecordFilter>,
    ) -> Result<(), ApiError> {
        self.calls.lock().push(Call::Delete {
            zone: zone.to_string(),
            filters: filters.clone(),
        });
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "Simulated delete failure".into(),
            });
        }

        self.records.lock().retain(|r| {
            !filters
                .iter()
                .any(|f| r.matches(&f.name, &f.record_type))
        });
        Ok(())
    }
}

/// Observer that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ChallengeEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ChallengeEvent> {
        self.events.lock().clone()
    }
}

impl ChallengeObserver for RecordingObserver {
    fn on_event(&self, event: &ChallengeEvent) {
        self.events.lock().push(event.clone());
    }
}

pub fn txt(name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        name: name.to_string(),
        record_type: TXT.to_string(),
        content: content.to_string(),
        ttl: 300,
    }
}

pub fn record(name: &str, record_type: &str, content: &str) -> DnsRecord {
    DnsRecord {
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
        ttl: 3600,
    }
}
