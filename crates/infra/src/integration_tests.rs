//! Integration tests for the full service pipeline.
//!
//! Tests: request → CargoService → domain operation → StateStore → ActionLog
//!
//! Verifies:
//! - Operations persist the new document and append exactly one log entry
//! - A failed log append leaves memory and the store on the previous state
//! - A failed save leaves memory, the store and the log untouched
//! - When the restore save also fails, memory matches what the store holds
//! - Status and metrics views are repeatable and append nothing to the log
//! - Concurrent placements never overfill a container
//! - State survives a restart on the file-backed stores

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use chrono::{DateTime, TimeZone, Utc};

    use cargohold_core::{ContainerId, DomainError};
    use cargohold_events::{ActionFilter, ActionLogEntry};
    use cargohold_storage::{CargoState, ItemStatus, NewContainer, NewItem, PlacementOutcome};

    use crate::action_log::{ActionLog, InMemoryActionLog, JsonLinesActionLog};
    use crate::seed::sample_state;
    use crate::service::{CargoService, ServiceError};
    use crate::state_store::{InMemoryStateStore, JsonFileStateStore, StateStore, StoreError};

    type MemoryService = CargoService<Arc<InMemoryStateStore>, Arc<InMemoryActionLog>>;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn setup(seed: bool) -> (MemoryService, Arc<InMemoryStateStore>, Arc<InMemoryActionLog>) {
        let store = Arc::new(InMemoryStateStore::new());
        let log = Arc::new(InMemoryActionLog::new());
        let seed = seed.then(|| sample_state(fixed_now()).unwrap());
        let service = CargoService::open(store.clone(), log.clone(), seed)
            .unwrap()
            .with_clock(fixed_now);
        (service, store, log)
    }

    fn action_names(service: &MemoryService) -> Vec<String> {
        service
            .logs(ActionFilter::all())
            .unwrap()
            .entries
            .into_iter()
            .map(|e| e.action)
            .collect()
    }

    #[test]
    fn seeded_store_is_saved_on_open() {
        let (service, store, log) = setup(true);
        let saved = store.load().unwrap().expect("seed saved");
        assert_eq!(saved, service.snapshot().unwrap());
        assert!(log.is_empty());
    }

    #[test]
    fn item_lifecycle_from_placement_to_return() {
        let (service, store, _log) = setup(true);

        let placed = service
            .place_item(
                NewItem::new("item_003", "Water Filter", 5.0, 2.0)
                    .with_priority(3)
                    .with_category("equipment"),
                None,
            )
            .unwrap();
        assert!(matches!(placed, PlacementOutcome::Placed { .. }));

        let hits = service.search("water", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item_id.as_str(), "item_003");

        let retrieved = service.retrieve_item("item_003").unwrap();
        assert_eq!(retrieved.last_accessed, fixed_now());

        let assignment = service
            .mark_as_waste("item_001", Some("expired".to_string()))
            .unwrap();
        assert_eq!(assignment.waste_container.as_str(), "waste_001");

        let plan = service.plan_return("waste_001").unwrap();
        assert_eq!(plan.total_items, 1);
        assert_eq!(plan.total_volume, 0.5);

        let receipt = service.confirm_return("waste_001").unwrap();
        assert_eq!(receipt.items_removed, 1);

        let state = service.snapshot().unwrap();
        state.check_invariants().unwrap();
        assert!(!state.items.keys().any(|id| id.as_str() == "item_001"));
        assert!(state.waste_containers.is_empty());
        assert_eq!(store.load().unwrap(), Some(state));

        assert_eq!(
            action_names(&service),
            [
                "confirm_return",
                "return_planning",
                "mark_as_waste",
                "retrieve_item",
                "search_item",
                "place_item",
            ]
        );
    }

    #[test]
    fn waste_items_leave_search_results() {
        let (service, _store, _log) = setup(true);
        service.mark_as_waste("item_002", None).unwrap();

        let hits = service.search("", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item_id.as_str(), "item_001");

        let details = service.item_details("item_002").unwrap();
        assert_eq!(details.item.status, ItemStatus::Waste);

        let err = service.mark_as_waste("item_002", None).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn rearrangement_proposal_then_apply_then_place() {
        let (service, _store, log) = setup(false);
        for (id, volume) in [("a", 10.0), ("c", 5.0), ("d", 5.0)] {
            service
                .add_container(NewContainer::new(id, volume, 100.0))
                .unwrap();
        }
        service
            .place_item(NewItem::new("x", "Crate X", 5.0, 1.0), Some("a"))
            .unwrap();
        service
            .place_item(NewItem::new("y", "Crate Y", 5.0, 1.0), Some("a"))
            .unwrap();
        let logged_before = log.len();
        let before = service.snapshot().unwrap();

        let big = NewItem::new("big", "Big Crate", 6.0, 1.0);
        let PlacementOutcome::RearrangementNeeded(moves) =
            service.place_item(big.clone(), None).unwrap()
        else {
            panic!("expected a rearrangement proposal");
        };
        assert_eq!(moves.len(), 2);
        assert_eq!(service.snapshot().unwrap(), before);
        assert_eq!(log.len(), logged_before);

        let applied = service.rearrange(moves).unwrap();
        assert_eq!(applied.len(), 2);

        let placed = service.place_item(big, None).unwrap();
        assert_eq!(
            placed,
            PlacementOutcome::Placed {
                item_id: "big".parse().unwrap(),
                container_id: ContainerId::new("a").unwrap(),
            }
        );
        service.snapshot().unwrap().check_invariants().unwrap();
        assert_eq!(
            action_names(&service)[..2],
            ["place_item".to_string(), "rearrange_items".to_string()]
        );
    }

    /// Accepts no entries.
    struct OfflineLog;

    impl ActionLog for OfflineLog {
        fn append(&self, _entry: ActionLogEntry) -> Result<(), StoreError> {
            Err(StoreError::Serialization("log offline".to_string()))
        }

        fn query(&self, _filter: &ActionFilter) -> Result<Vec<ActionLogEntry>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failed_log_append_rolls_back_state() {
        let original = sample_state(fixed_now()).unwrap();
        let store = Arc::new(InMemoryStateStore::with_state(original.clone()));
        let service = CargoService::open(store.clone(), OfflineLog, None)
            .unwrap()
            .with_clock(fixed_now);

        let err = service
            .add_container(NewContainer::new("storage_003", 10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, ServiceError::StoreFailure(_)));

        let err = service.retrieve_item("item_001").unwrap_err();
        assert!(matches!(err, ServiceError::StoreFailure(_)));

        assert_eq!(service.snapshot().unwrap(), original);
        assert_eq!(store.load().unwrap(), Some(original));
    }

    /// Holds a document but refuses every write.
    struct ReadOnlyStore(CargoState);

    impl StateStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<CargoState>, StoreError> {
            Ok(Some(self.0.clone()))
        }

        fn save(&self, _state: &CargoState) -> Result<(), StoreError> {
            Err(StoreError::Serialization("disk full".to_string()))
        }
    }

    #[test]
    fn failed_save_commits_nothing() {
        let original = sample_state(fixed_now()).unwrap();
        let store = Arc::new(ReadOnlyStore(original.clone()));
        let log = Arc::new(InMemoryActionLog::new());
        let service = CargoService::open(store.clone(), log.clone(), None)
            .unwrap()
            .with_clock(fixed_now);

        let err = service
            .add_container(NewContainer::new("storage_003", 10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, ServiceError::StoreFailure(_)));

        let err = service.retrieve_item("item_001").unwrap_err();
        assert!(matches!(err, ServiceError::StoreFailure(_)));

        assert_eq!(service.snapshot().unwrap(), original);
        assert_eq!(store.load().unwrap(), Some(original));
        assert!(log.is_empty());
    }

    /// Accepts a fixed number of saves, then fails every one after.
    struct ExhaustedStore {
        inner: InMemoryStateStore,
        saves_left: AtomicUsize,
    }

    impl StateStore for ExhaustedStore {
        fn load(&self) -> Result<Option<CargoState>, StoreError> {
            self.inner.load()
        }

        fn save(&self, state: &CargoState) -> Result<(), StoreError> {
            let left = self.saves_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(StoreError::Serialization("disk full".to_string()));
            }
            self.saves_left.store(left - 1, Ordering::SeqCst);
            self.inner.save(state)
        }
    }

    #[test]
    fn failed_restore_keeps_memory_on_the_saved_document() {
        let store = Arc::new(ExhaustedStore {
            inner: InMemoryStateStore::with_state(sample_state(fixed_now()).unwrap()),
            saves_left: AtomicUsize::new(1),
        });
        let service = CargoService::open(store.clone(), OfflineLog, None)
            .unwrap()
            .with_clock(fixed_now);

        let err = service
            .add_container(NewContainer::new("storage_009", 10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, ServiceError::StoreFailure(_)));

        let in_memory = service.snapshot().unwrap();
        let persisted = store.load().unwrap().expect("document saved");
        assert_eq!(in_memory, persisted);
        let added = ContainerId::new("storage_009").unwrap();
        assert!(in_memory.container(&added).is_ok());
        in_memory.check_invariants().unwrap();
    }

    #[test]
    fn status_and_metrics_are_repeatable_and_unlogged() {
        let (service, _store, log) = setup(true);
        service.search("", None).unwrap();
        service.retrieve_item("item_001").unwrap();
        let logged = log.len();

        let metrics = service.efficiency_metrics().unwrap();
        assert_eq!(service.efficiency_metrics().unwrap(), metrics);

        let status = service.storage_status().unwrap();
        assert_eq!(service.storage_status().unwrap(), status);
        assert_eq!(status.item_stats.total_active_items, 2);

        let expiring = service.expiring_items(120).unwrap();
        assert_eq!(service.expiring_items(120).unwrap(), expiring);
        assert_eq!(expiring.len(), 1);

        assert_eq!(log.len(), logged);
    }

    #[test]
    fn concurrent_placements_respect_capacity() {
        let (service, _store, _log) = setup(false);
        service
            .add_container(NewContainer::new("only", 20.0, 100.0))
            .unwrap();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let service = service.clone();
                thread::spawn(move || {
                    (0..5)
                        .filter(|n| {
                            let id = format!("w{worker}-{n}");
                            match service.place_item(NewItem::new(id, "Cube", 1.0, 1.0), None) {
                                Ok(_) => true,
                                Err(ServiceError::Domain(DomainError::NoCapacity(_))) => false,
                                Err(other) => panic!("unexpected error: {other}"),
                            }
                        })
                        .count()
                })
            })
            .collect();
        let placed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(placed, 20);
        let state = service.snapshot().unwrap();
        state.check_invariants().unwrap();
        let only = state.container(&ContainerId::new("only").unwrap()).unwrap();
        assert_eq!(only.capacity.used_volume, 20.0);
        assert_eq!(service.logs(ActionFilter::action("place_item")).unwrap().total, 20);
    }

    #[test]
    fn file_stores_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cargo_data.json");
        let logs = dir.path().join("cargo_logs.jsonl");

        {
            let service = CargoService::open(
                JsonFileStateStore::new(&data),
                JsonLinesActionLog::new(&logs),
                Some(sample_state(fixed_now()).unwrap()),
            )
            .unwrap()
            .with_clock(fixed_now);
            service
                .place_item(NewItem::new("item_009", "Spare Gasket", 0.2, 0.1), None)
                .unwrap();
        }

        let reopened = CargoService::open(
            JsonFileStateStore::new(&data),
            JsonLinesActionLog::new(&logs),
            None,
        )
        .unwrap();
        let state = reopened.snapshot().unwrap();
        assert_eq!(state.items.len(), 3);
        assert!(state.items.keys().any(|id| id.as_str() == "item_009"));

        let page = reopened.logs(ActionFilter::all()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].details["item_id"], "item_009");
    }
}
