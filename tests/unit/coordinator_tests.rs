//! Integration tests for the journal coordinator: lazy creation, absent
//! journals, event shapes, retention and teardown.

use super::test_helpers::{enabled, fixture, init_tracing, orders, orders_fixture};
use map_event_journal::prelude::*;
use std::sync::Arc;

fn read_all(journal: &JournalCoordinator, partition: PartitionId) -> Vec<MapEvent<String, String>> {
    let mut result = ReadResultSet::new(0, 100).expect("result set");
    let oldest = journal.oldest_sequence(&orders(), partition).expect("journal");
    journal
        .read_many(&orders(), partition, oldest, &mut result)
        .expect("read");
    result
        .items()
        .iter()
        .map(|record| {
            record
                .deserialize(journal.serializer())
                .expect("deserialize")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// absent journals
// ---------------------------------------------------------------------------

#[test]
fn test_writes_to_unconfigured_map_are_noops() {
    let f = orders_fixture(100, 4);
    let trades = ObjectNamespace::map("trades");
    let pid = PartitionId::new(0);

    assert!(f.journal.write_add_event(&trades, pid, "k", "v").is_ok());
    assert!(f.journal.write_update_event(&trades, pid, "k", "v", "w").is_ok());
    assert!(f.journal.write_remove_event(&trades, pid, "k", "w").is_ok());
    assert!(f.journal.write_evict_event(&trades, pid, "k", "w").is_ok());

    assert_eq!(f.store.container_count(), 0);
    assert!(!f.journal.has_event_journal(&trades));
}

#[test]
fn test_writes_to_disabled_journal_are_noops() {
    let settings = JournalSettings::new()
        .with_journal("orders", JournalConfig::enabled_with_capacity(100).with_enabled(false))
        .expect("config");
    let f = fixture(settings, 4, Version::new(4, 0));

    assert!(f.journal.write_add_event(&orders(), PartitionId::new(1), "k", "v").is_ok());
    assert_eq!(f.store.container_count(), 0);
    assert!(!f.journal.has_event_journal(&orders()));
    assert!(f.journal.event_journal_config(&orders()).is_some());
}

#[test]
fn test_queries_on_unconfigured_map_fail_not_configured() {
    let f = orders_fixture(100, 4);
    let trades = ObjectNamespace::map("trades");
    let pid = PartitionId::new(2);

    for result in [
        f.journal.oldest_sequence(&trades, pid).map(|_| ()),
        f.journal.newest_sequence(&trades, pid).map(|_| ()),
        f.journal.cleanup(&trades, pid),
        f.journal.is_available_or_next_sequence(&trades, pid, 0),
        f.journal.is_next_available_sequence(&trades, pid, 0).map(|_| ()),
    ] {
        match result {
            Err(JournalError::NotConfigured { object_name }) => assert_eq!(object_name, "trades"),
            other => panic!("expected NotConfigured, got {other:?}"),
        }
    }
    assert_eq!(f.store.container_count(), 0);
}

#[test]
fn test_read_many_on_unconfigured_map_fails() {
    let f = orders_fixture(100, 4);
    let mut result = ReadResultSet::new(0, 10).expect("result set");
    let read = f
        .journal
        .read_many(&ObjectNamespace::map("trades"), PartitionId::new(0), 0, &mut result);
    assert!(matches!(read, Err(JournalError::NotConfigured { .. })));
}

// ---------------------------------------------------------------------------
// version gate
// ---------------------------------------------------------------------------

#[test]
fn test_old_cluster_disables_journal_until_upgrade() {
    init_tracing();
    let f = fixture(enabled("orders", 100), 4, Version::new(3, 8));
    let pid = PartitionId::new(0);

    assert!(!f.journal.has_event_journal(&orders()));
    assert!(f.journal.event_journal_config(&orders()).is_none());
    assert!(f.journal.write_add_event(&orders(), pid, "k", "v").is_ok());
    assert_eq!(f.store.container_count(), 0);
    assert!(matches!(
        f.journal.newest_sequence(&orders(), pid),
        Err(JournalError::NotConfigured { .. })
    ));

    f.cluster.set_cluster_version(MIN_EVENT_JOURNAL_VERSION);

    assert!(f.journal.has_event_journal(&orders()));
    assert!(f.journal.write_add_event(&orders(), pid, "k", "v").is_ok());
    assert_eq!(f.journal.newest_sequence(&orders(), pid).expect("journal"), 0);
    assert_eq!(f.store.container_count(), 1);
}

#[test]
fn test_has_event_journal_does_not_touch_storage() {
    let f = orders_fixture(100, 4);
    assert!(f.journal.has_event_journal(&orders()));
    assert_eq!(f.store.container_count(), 0);
}

// ---------------------------------------------------------------------------
// configuration translation
// ---------------------------------------------------------------------------

#[test]
fn test_storage_config_uses_live_partition_count() {
    let f = orders_fixture(100, 4);
    let config = JournalConfig::enabled_with_capacity(100).with_time_to_live_seconds(60);
    let storage = f.journal.to_storage_config(&config).expect("storage config");
    assert_eq!(storage.capacity, 25);
    assert_eq!(storage.time_to_live_seconds, 60);
    assert_eq!(storage.backup_count, 0);
    assert_eq!(storage.async_backup_count, 0);
}

#[test]
fn test_capacity_below_partition_count_surfaces_invalid_config() {
    let f = orders_fixture(3, 4);
    assert!(matches!(
        f.journal.write_add_event(&orders(), PartitionId::new(0), "k", "v"),
        Err(JournalError::InvalidConfig { .. })
    ));
    assert_eq!(f.store.container_count(), 0);
}

// ---------------------------------------------------------------------------
// event shapes
// ---------------------------------------------------------------------------

#[test]
fn test_event_shapes_follow_event_type() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(3);

    f.journal.write_add_event(&orders(), pid, "k", "v1").expect("add");
    f.journal
        .write_update_event(&orders(), pid, "k", "v1", "v2")
        .expect("update");
    f.journal.write_remove_event(&orders(), pid, "k", "v2").expect("remove");
    f.journal.write_evict_event(&orders(), pid, "k", "v3").expect("evict");

    let events = read_all(&f.journal, pid);
    let some = |s: &str| Some(s.to_string());
    assert_eq!(
        events,
        vec![
            MapEvent {
                key: "k".to_string(),
                new_value: some("v1"),
                old_value: None,
                event_type: EventType::Added,
            },
            MapEvent {
                key: "k".to_string(),
                new_value: some("v2"),
                old_value: some("v1"),
                event_type: EventType::Updated,
            },
            MapEvent {
                key: "k".to_string(),
                new_value: None,
                old_value: some("v2"),
                event_type: EventType::Removed,
            },
            MapEvent {
                key: "k".to_string(),
                new_value: None,
                old_value: some("v3"),
                event_type: EventType::Evicted,
            },
        ]
    );
}

#[test]
fn test_partitions_are_independent() {
    let f = orders_fixture(100, 4);
    f.journal
        .write_add_event(&orders(), PartitionId::new(0), "a", "1")
        .expect("write");
    f.journal
        .write_add_event(&orders(), PartitionId::new(0), "b", "2")
        .expect("write");
    f.journal
        .write_add_event(&orders(), PartitionId::new(1), "c", "3")
        .expect("write");

    assert_eq!(f.journal.newest_sequence(&orders(), PartitionId::new(0)).expect("p0"), 1);
    assert_eq!(f.journal.newest_sequence(&orders(), PartitionId::new(1)).expect("p1"), 0);
    assert_eq!(f.store.container_count(), 2);
}

// ---------------------------------------------------------------------------
// retention
// ---------------------------------------------------------------------------

#[test]
fn test_overflowing_partition_capacity_evicts_oldest() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);

    for i in 0..25 {
        f.journal.write_add_event(&orders(), pid, &i, "v").expect("write");
    }
    let oldest_before = f.journal.oldest_sequence(&orders(), pid).expect("journal");
    assert_eq!(oldest_before, 0);
    assert_eq!(f.journal.newest_sequence(&orders(), pid).expect("journal"), 24);

    f.journal.write_add_event(&orders(), pid, &25, "v").expect("write");

    let oldest_after = f.journal.oldest_sequence(&orders(), pid).expect("journal");
    assert_eq!(oldest_after, oldest_before + 1);
    assert_eq!(f.journal.newest_sequence(&orders(), pid).expect("journal"), 25);
    assert!(matches!(
        f.journal.is_available_or_next_sequence(&orders(), pid, 0),
        Err(JournalError::StaleSequence { sequence: 0, head_sequence: 1 })
    ));
}

#[test]
fn test_cleanup_drops_expired_records() {
    let settings = JournalSettings::new()
        .with_journal(
            "orders",
            JournalConfig::enabled_with_capacity(40).with_time_to_live_seconds(1),
        )
        .expect("config");
    let f = fixture(settings, 4, Version::new(4, 0));
    let pid = PartitionId::new(0);

    // materialize the container and age two records by hand
    assert_eq!(f.journal.newest_sequence(&orders(), pid).expect("journal"), -1);
    let container = f.store.get_container_or_none(pid, &orders()).expect("container");
    let serializer = JsonWireSerializer::new();
    for i in 0..2 {
        let record = EventRecord::added(
            serializer.to_data(&i).expect("key"),
            serializer.to_data("v").expect("value"),
        );
        container.add_at(record, 0).expect("add");
    }
    f.journal.write_add_event(&orders(), pid, &2, "v").expect("write");

    f.journal.cleanup(&orders(), pid).expect("cleanup");

    assert_eq!(f.journal.oldest_sequence(&orders(), pid).expect("journal"), 2);
    assert_eq!(f.journal.newest_sequence(&orders(), pid).expect("journal"), 2);
}

#[test]
fn test_cleanup_without_ttl_keeps_records() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);
    f.journal.write_add_event(&orders(), pid, "k", "v").expect("write");
    f.journal.cleanup(&orders(), pid).expect("cleanup");
    assert_eq!(f.journal.oldest_sequence(&orders(), pid).expect("journal"), 0);
}

// ---------------------------------------------------------------------------
// availability
// ---------------------------------------------------------------------------

#[test]
fn test_availability_checks() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);

    // empty journal: 0 is the next sequence
    assert!(f.journal.is_available_or_next_sequence(&orders(), pid, 0).is_ok());
    assert!(f.journal.is_next_available_sequence(&orders(), pid, 0).expect("journal"));

    let err = f
        .journal
        .is_available_or_next_sequence(&orders(), pid, 1)
        .expect_err("unreachable sequence");
    assert!(err.is_out_of_range());

    f.journal.write_add_event(&orders(), pid, "k", "v").expect("write");
    assert!(!f.journal.is_next_available_sequence(&orders(), pid, 0).expect("journal"));
    assert!(f.journal.is_next_available_sequence(&orders(), pid, 1).expect("journal"));
    assert!(f.journal.is_available_or_next_sequence(&orders(), pid, 1).is_ok());
}

#[test]
fn test_read_many_respects_predicate_and_projection() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);
    for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
        f.journal.write_add_event(&orders(), pid, key, value).expect("write");
    }
    f.journal.write_remove_event(&orders(), pid, "a", "1").expect("write");

    let serializer = *f.journal.serializer();
    let mut result = ReadResultSet::projected(0, 10, move |record: &EventRecord| {
        serializer
            .to_object::<String>(record.key())
            .unwrap_or_default()
    })
    .expect("result set")
    .with_predicate(|record| record.event_type() == EventType::Added);

    let read = f
        .journal
        .read_many(&orders(), pid, 1, &mut result)
        .expect("read");

    assert_eq!(read, 3);
    assert_eq!(result.read_count(), 3);
    assert_eq!(result.items(), &["b".to_string(), "c".to_string()]);
    assert_eq!(result.sequences(), &[1, 2]);
    assert_eq!(result.next_sequence_to_read(), 4);
}

// ---------------------------------------------------------------------------
// destroy
// ---------------------------------------------------------------------------

#[test]
fn test_destroy_removes_container_and_recreates_lazily() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);
    for i in 0..5 {
        f.journal.write_add_event(&orders(), pid, &i, "v").expect("write");
    }
    let before = f.store.get_container_or_none(pid, &orders()).expect("container");

    f.journal.destroy(&orders(), pid);
    assert!(f.store.get_container_or_none(pid, &orders()).is_none());

    // the old handle stays usable
    assert_eq!(before.tail_sequence().expect("tail"), 4);

    // the next query starts a fresh journal
    assert_eq!(f.journal.newest_sequence(&orders(), pid).expect("journal"), -1);
    let after = f.store.get_container_or_none(pid, &orders()).expect("container");
    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn test_destroy_of_missing_journal_is_quiet() {
    let f = orders_fixture(100, 4);
    f.journal.destroy(&ObjectNamespace::map("never"), PartitionId::new(9));
    assert_eq!(f.store.container_count(), 0);
}

#[test]
fn test_destroy_before_store_registration_is_swallowed() {
    init_tracing();
    let handle = StoreHandle::unregistered();
    let journal: JournalCoordinator = JournalCoordinator::new(
        ConfigResolver::new(
            Arc::new(enabled("orders", 100)),
            Arc::new(ClusterState::new(Version::new(4, 0))),
            Arc::new(FixedPartitionTopology::new(4)),
        ),
        handle.clone(),
        Arc::new(WaitRegistry::new()),
        JsonWireSerializer::new(),
    );

    journal.destroy(&orders(), PartitionId::new(0));

    // other operations surface the missing service
    assert!(matches!(
        journal.write_add_event(&orders(), PartitionId::new(0), "k", "v"),
        Err(JournalError::ServiceUnavailable { .. })
    ));

    assert!(handle.register(Arc::new(JournalStore::new())));
    assert!(journal.write_add_event(&orders(), PartitionId::new(0), "k", "v").is_ok());
    assert_eq!(journal.newest_sequence(&orders(), PartitionId::new(0)).expect("journal"), 0);
}

#[test]
fn test_wait_notify_key_is_deterministic() {
    let f = orders_fixture(100, 4);
    let a = f.journal.wait_notify_key(&orders(), PartitionId::new(1));
    let b = f.journal.wait_notify_key(&orders(), PartitionId::new(1));
    assert_eq!(a, b);
    assert_eq!(a.namespace(), &orders());
    assert_eq!(a.partition_id(), PartitionId::new(1));
    assert_ne!(a, f.journal.wait_notify_key(&orders(), PartitionId::new(2)));
}
