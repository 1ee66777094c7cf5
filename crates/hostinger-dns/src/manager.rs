//! TXT record reconciliation within a zone
//!
//! Creation lists the zone, removes any same-name TXT records, then adds the
//! new record with `overwrite` disabled. Removal of conflicting records and
//! the final cleanup are best-effort: failures are reported to the observer
//! and never abort the caller. Every provider call is attempted exactly once.

use std::sync::Arc;

use crate::api::{RecordFilter, RecordSet, ZoneApi, TXT};
use crate::error::ChallengeError;
use crate::observer::{ChallengeEvent, ChallengeObserver, Operation, Stage, TracingObserver};
use crate::zone::{resolve_zone, to_relative_name, RelativeName, Zone};

/// Creates and removes TXT records through a [`ZoneApi`]
pub struct ZoneRecordManager {
    api: Arc<dyn ZoneApi>,
    observer: Arc<dyn ChallengeObserver>,
}

impl ZoneRecordManager {
    pub fn new(api: Arc<dyn ZoneApi>) -> Self {
        Self::with_observer(api, Arc::new(TracingObserver))
    }

    pub fn with_observer(api: Arc<dyn ZoneApi>, observer: Arc<dyn ChallengeObserver>) -> Self {
        Self { api, observer }
    }

    /// Create a TXT record named `record_name` in the zone of `domain`,
    /// replacing any TXT records already at that name
    pub async fn upsert_txt(
        &self,
        domain: &str,
        record_name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<(), ChallengeError> {
        let zone = resolve_zone(domain);
        self.upsert_txt_in_zone(domain, &zone, record_name, content, ttl)
            .await
    }

    /// Like [`upsert_txt`](Self::upsert_txt) with an explicit zone, for
    /// domains under multi-label public suffixes
    pub async fn upsert_txt_in_zone(
        &self,
        domain: &str,
        zone: &Zone,
        record_name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<(), ChallengeError> {
        let name = to_relative_name(record_name, zone);
        let event = |operation, stage| ChallengeEvent::new(operation, stage, domain, zone, &name);

        tracing::debug!(zone = %zone, relative_name = %name, ttl, "Using zone for TXT record");
        self.observer.on_event(&event(Operation::Upsert, Stage::Started));

        let records = match self.api.list_records(zone.as_str()).await {
            Ok(records) => records,
            Err(e) => {
                self.observer.on_event(
                    &event(Operation::Upsert, Stage::Failed).with_detail(e.to_string()),
                );
                return Err(ChallengeError::provider(
                    "Encountered error adding TXT record",
                    e,
                ));
            }
        };

        let conflicts = records
            .iter()
            .filter(|r| r.matches(name.as_str(), TXT))
            .count();

        if conflicts > 0 {
            self.remove_conflicts(zone, &name, conflicts, &event).await;
        } else {
            self.observer
                .on_event(&event(Operation::ConflictCleanup, Stage::Skipped));
        }

        let record_set = RecordSet::txt(name.as_str(), content, ttl);
        if let Err(e) = self.api.update_records(zone.as_str(), record_set, false).await {
            self.observer
                .on_event(&event(Operation::Upsert, Stage::Failed).with_detail(e.to_string()));
            return Err(ChallengeError::provider(
                "Encountered error adding TXT record",
                e,
            ));
        }

        self.observer
            .on_event(&event(Operation::Upsert, Stage::Succeeded));
        Ok(())
    }

    async fn remove_conflicts(
        &self,
        zone: &Zone,
        name: &RelativeName,
        conflicts: usize,
        event: &impl Fn(Operation, Stage) -> ChallengeEvent,
    ) {
        let detail = format!("{} existing record(s)", conflicts);
        self.observer.on_event(
            &event(Operation::ConflictCleanup, Stage::Started).with_detail(detail.as_str()),
        );

        match self
            .api
            .delete_records(zone.as_str(), vec![RecordFilter::txt(name.as_str())])
            .await
        {
            Ok(()) => self.observer.on_event(
                &event(Operation::ConflictCleanup, Stage::Succeeded).with_detail(detail),
            ),
            // The create below may still succeed, or fail on its own
            Err(e) => self.observer.on_event(
                &event(Operation::ConflictCleanup, Stage::Failed).with_detail(e.to_string()),
            ),
        }
    }

    /// Remove TXT records named `record_name` from the zone of `domain`
    ///
    /// Failures are reported to the observer and otherwise ignored.
    pub async fn delete_txt(&self, domain: &str, record_name: &str) {
        let zone = resolve_zone(domain);
        self.delete_txt_in_zone(domain, &zone, record_name).await
    }

    /// Like [`delete_txt`](Self::delete_txt) with an explicit zone
    pub async fn delete_txt_in_zone(&self, domain: &str, zone: &Zone, record_name: &str) {
        let name = to_relative_name(record_name, zone);
        let event = |stage| ChallengeEvent::new(Operation::Delete, stage, domain, zone, &name);

        self.observer.on_event(&event(Stage::Started));

        match self
            .api
            .delete_records(zone.as_str(), vec![RecordFilter::txt(name.as_str())])
            .await
        {
            Ok(()) => self.observer.on_event(&event(Stage::Succeeded)),
            Err(e) => self
                .observer
                .on_event(&event(Stage::Failed).with_detail(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{record, txt, Call, RecordingObserver, StubZoneApi};

    fn manager(api: &Arc<StubZoneApi>) -> (ZoneRecordManager, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let manager = ZoneRecordManager::with_observer(api.clone(), observer.clone());
        (manager, observer)
    }

    #[tokio::test]
    async fn test_upsert_subdomain_uses_zone_and_relative_name() {
        let api = Arc::new(StubZoneApi::new());
        let (manager, _) = manager(&api);

        manager
            .upsert_txt("sso.bbdevs.com", "_acme-challenge.sso.bbdevs.com", "tok123", 300)
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![
                Call::List {
                    zone: "bbdevs.com".to_string()
                },
                Call::Update {
                    zone: "bbdevs.com".to_string(),
                    record_set: RecordSet::txt("_acme-challenge.sso", "tok123", 300),
                    overwrite: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_upsert_without_conflict_still_creates() {
        let api = Arc::new(StubZoneApi::with_records(vec![
            record("@", "A", "192.0.2.1"),
            record("www", "CNAME", "bbdevs.com"),
        ]));
        let (manager, observer) = manager(&api);

        manager
            .upsert_txt("bbdevs.com", "_acme-challenge.bbdevs.com", "content", 60)
            .await
            .unwrap();

        let calls = api.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::Delete { .. })));
        assert!(matches!(calls.last(), Some(Call::Update { .. })));
        assert!(observer
            .events()
            .iter()
            .any(|e| e.operation == Operation::ConflictCleanup && e.stage == Stage::Skipped));
    }

    #[tokio::test]
    async fn test_upsert_deletes_conflict_once_before_create() {
        let api = Arc::new(StubZoneApi::with_records(vec![
            record("@", "A", "192.0.2.1"),
            txt("_acme-challenge", "old-challenge-content"),
        ]));
        let (manager, _) = manager(&api);

        manager
            .upsert_txt("bbdevs.com", "_acme-challenge.bbdevs.com", "new-content", 300)
            .await
            .unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            Call::Delete {
                zone: "bbdevs.com".to_string(),
                filters: vec![RecordFilter::txt("_acme-challenge")],
            }
        );
        assert!(matches!(calls[2], Call::Update { overwrite: false, .. }));
    }

    #[tokio::test]
    async fn test_upsert_ignores_same_name_records_of_other_types() {
        let api = Arc::new(StubZoneApi::with_records(vec![record(
            "_acme-challenge",
            "CNAME",
            "elsewhere.example.net",
        )]));
        let (manager, _) = manager(&api);

        manager
            .upsert_txt("bbdevs.com", "_acme-challenge.bbdevs.com", "content", 60)
            .await
            .unwrap();

        assert!(!api
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Delete { .. })));
    }

    #[tokio::test]
    async fn test_upsert_twice_leaves_single_latest_record() {
        let api = Arc::new(StubZoneApi::with_records(vec![record("@", "A", "192.0.2.1")]));
        let (manager, _) = manager(&api);

        for content in ["first", "second"] {
            manager
                .upsert_txt("sso.bbdevs.com", "_acme-challenge.sso.bbdevs.com", content, 60)
                .await
                .unwrap();
        }

        let challenge = api.txt_records("_acme-challenge.sso");
        assert_eq!(challenge.len(), 1);
        assert_eq!(challenge[0].content, "second");
        // Unrelated record untouched
        assert_eq!(api.records().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_continues_when_conflict_delete_fails() {
        let api = Arc::new(StubZoneApi::with_records(vec![txt("_acme-challenge", "stale")]));
        api.set_fail_delete(true);
        let (manager, observer) = manager(&api);

        manager
            .upsert_txt("bbdevs.com", "_acme-challenge.bbdevs.com", "fresh", 60)
            .await
            .unwrap();

        assert!(matches!(api.calls().last(), Some(Call::Update { .. })));
        let failed = observer
            .events()
            .into_iter()
            .find(|e| e.operation == Operation::ConflictCleanup && e.stage == Stage::Failed)
            .expect("conflict cleanup failure should be reported");
        assert!(failed.detail.unwrap().contains("Simulated delete failure"));
    }

    #[tokio::test]
    async fn test_upsert_list_failure_is_fatal() {
        let api = Arc::new(StubZoneApi::new());
        api.set_fail_list(true);
        let (manager, observer) = manager(&api);

        let err = manager
            .upsert_txt("bbdevs.com", "_acme-challenge.bbdevs.com", "content", 60)
            .await
            .unwrap_err();

        assert!(matches!(err, ChallengeError::ProviderOperation { .. }));
        assert!(err.to_string().contains("Encountered error adding TXT record"));
        // Nothing is created after a failed listing
        assert_eq!(api.calls().len(), 1);
        assert!(observer
            .events()
            .iter()
            .any(|e| e.operation == Operation::Upsert && e.stage == Stage::Failed));
    }

    #[tokio::test]
    async fn test_upsert_create_failure_is_fatal() {
        let api = Arc::new(StubZoneApi::new());
        api.set_fail_update(true);
        let (manager, _) = manager(&api);

        let err = manager
            .upsert_txt("bbdevs.com", "_acme-challenge.bbdevs.com", "content", 60)
            .await
            .unwrap_err();

        match err {
            ChallengeError::ProviderOperation { source, .. } => {
                assert!(matches!(source, crate::api::ApiError::Status { status: 422, .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_upsert_apex_record() {
        let api = Arc::new(StubZoneApi::new());
        let (manager, _) = manager(&api);

        manager
            .upsert_txt("bbdevs.com", "bbdevs.com", "apex-value", 60)
            .await
            .unwrap();

        assert_eq!(api.txt_records("@").len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_in_explicit_zone() {
        let api = Arc::new(StubZoneApi::new());
        let (manager, _) = manager(&api);
        let zone = Zone::new("domain.co.uk");

        manager
            .upsert_txt_in_zone(
                "www.domain.co.uk",
                &zone,
                "_acme-challenge.www.domain.co.uk",
                "value",
                60,
            )
            .await
            .unwrap();

        assert_eq!(
            api.calls()[0],
            Call::List {
                zone: "domain.co.uk".to_string()
            }
        );
        assert_eq!(api.txt_records("_acme-challenge.www").len(), 1);
    }

    #[tokio::test]
    async fn test_delete_uses_name_and_type_filter() {
        let api = Arc::new(StubZoneApi::with_records(vec![
            txt("_acme-challenge.sso", "tok123"),
            record("sso", "A", "192.0.2.2"),
        ]));
        let (manager, observer) = manager(&api);

        manager
            .delete_txt("sso.bbdevs.com", "_acme-challenge.sso.bbdevs.com")
            .await;

        assert_eq!(
            api.calls(),
            vec![Call::Delete {
                zone: "bbdevs.com".to_string(),
                filters: vec![RecordFilter::txt("_acme-challenge.sso")],
            }]
        );
        assert!(api.txt_records("_acme-challenge.sso").is_empty());
        assert_eq!(api.records().len(), 1);
        assert!(observer
            .events()
            .iter()
            .any(|e| e.operation == Operation::Delete && e.stage == Stage::Succeeded));
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_fatal() {
        let api = Arc::new(StubZoneApi::new());
        api.set_fail_delete(true);
        let (manager, observer) = manager(&api);

        manager
            .delete_txt("bbdevs.com", "_acme-challenge.bbdevs.com")
            .await;

        let events = observer.events();
        let last = events.last().unwrap();
        assert_eq!(last.operation, Operation::Delete);
        assert_eq!(last.stage, Stage::Failed);
        assert_eq!(last.zone.as_str(), "bbdevs.com");
        assert_eq!(last.relative_name, "_acme-challenge");
    }
}
