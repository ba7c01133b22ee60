//! Blocking reads: parking on the wait key and waking on writes.

use super::test_helpers::{init_tracing, orders, orders_fixture};
use map_event_journal::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parked_reader_wakes_on_write() {
    init_tracing();
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);
    let state = f.journal.subscribe(&orders(), pid).expect("subscribe");
    assert_eq!(state.newest_sequence, -1);

    let journal = Arc::clone(&f.journal);
    let reader = tokio::spawn(async move {
        let result = ReadResultSet::new(1, 10).expect("result set");
        journal.read_blocking(&orders(), pid, 0, result).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!reader.is_finished());

    f.journal
        .write_add_event(&orders(), pid, "order-1", &7u32)
        .expect("write");

    let batch = timeout(WAIT, reader)
        .await
        .expect("reader woke")
        .expect("task")
        .expect("read");
    assert_eq!(batch.sequences(), &[0]);
    let event: MapEvent<String, u32> = batch.items()[0]
        .deserialize(f.journal.serializer())
        .expect("deserialize");
    assert_eq!(event.key, "order-1");
    assert_eq!(event.new_value, Some(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_every_parked_reader_is_woken() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(1);
    f.journal.write_add_event(&orders(), pid, "a", "1").expect("write");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let journal = Arc::clone(&f.journal);
            tokio::spawn(async move {
                let result = ReadResultSet::new(1, 10).expect("result set");
                journal.read_blocking(&orders(), pid, 1, result).await
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(50)).await;
    f.journal.write_add_event(&orders(), pid, "b", "2").expect("write");

    for reader in readers {
        let batch = timeout(WAIT, reader)
            .await
            .expect("reader woke")
            .expect("task")
            .expect("read");
        assert_eq!(batch.sequences(), &[1]);
    }
}

#[tokio::test]
async fn test_reader_without_writes_times_out() {
    let f = orders_fixture(100, 4);
    let result = ReadResultSet::new(1, 10).expect("result set");
    let outcome = timeout(
        Duration::from_millis(50),
        f.journal
            .read_blocking(&orders(), PartitionId::new(0), 0, result),
    )
    .await;
    assert!(outcome.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reader_waits_until_min_size_is_reached() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(2);

    let journal = Arc::clone(&f.journal);
    let reader = tokio::spawn(async move {
        let result = ReadResultSet::new(3, 10).expect("result set");
        journal.read_blocking(&orders(), pid, 0, result).await
    });

    for i in 0..3u32 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        f.journal.write_add_event(&orders(), pid, &i, &i).expect("write");
    }

    let batch = timeout(WAIT, reader)
        .await
        .expect("reader woke")
        .expect("task")
        .expect("read");
    assert_eq!(batch.sequences(), &[0, 1, 2]);
    assert_eq!(batch.next_sequence_to_read(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_filtered_records_keep_the_reader_parked() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(3);

    let journal = Arc::clone(&f.journal);
    let reader = tokio::spawn(async move {
        let result = ReadResultSet::new(1, 10)
            .expect("result set")
            .with_predicate(|record: &EventRecord| record.event_type() == EventType::Removed);
        journal.read_blocking(&orders(), pid, 0, result).await
    });

    f.journal.write_add_event(&orders(), pid, "k", "v").expect("write");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!reader.is_finished());

    f.journal.write_remove_event(&orders(), pid, "k", "v").expect("write");

    let batch = timeout(WAIT, reader)
        .await
        .expect("reader woke")
        .expect("task")
        .expect("read");
    assert_eq!(batch.sequences(), &[1]);
    assert_eq!(batch.read_count(), 2);
}

#[tokio::test]
async fn test_max_size_caps_a_batch() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);
    for i in 0..5u32 {
        f.journal.write_add_event(&orders(), pid, &i, &i).expect("write");
    }

    let result = ReadResultSet::new(1, 2).expect("result set");
    let batch = timeout(WAIT, f.journal.read_blocking(&orders(), pid, 0, result))
        .await
        .expect("no wait")
        .expect("read");
    assert_eq!(batch.sequences(), &[0, 1]);
    assert_eq!(batch.next_sequence_to_read(), 2);
}

#[tokio::test]
async fn test_stale_start_sequence_is_rejected() {
    let f = orders_fixture(8, 4);
    let pid = PartitionId::new(0);
    for i in 0..5u32 {
        f.journal.write_add_event(&orders(), pid, &i, &i).expect("write");
    }

    let result = ReadResultSet::new(1, 10).expect("result set");
    let outcome = f.journal.read_blocking(&orders(), pid, 0, result).await;
    assert!(matches!(
        outcome,
        Err(JournalError::StaleSequence { sequence: 0, head_sequence: 3 })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_destroy_ends_parked_reader_without_recreating() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(0);
    for i in 0..3u32 {
        f.journal.write_add_event(&orders(), pid, &i, &i).expect("write");
    }

    let journal = Arc::clone(&f.journal);
    let reader = tokio::spawn(async move {
        let result = ReadResultSet::new(1, 10).expect("result set");
        journal.read_blocking(&orders(), pid, 3, result).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!reader.is_finished());

    f.journal.destroy(&orders(), pid);

    let outcome = timeout(WAIT, reader)
        .await
        .expect("reader woke")
        .expect("task");
    match outcome {
        Err(JournalError::Destroyed {
            object_name,
            partition_id,
        }) => {
            assert_eq!(object_name, "orders");
            assert_eq!(partition_id, pid);
        }
        other => panic!("expected Destroyed, got {other:?}"),
    }
    assert_eq!(f.store.container_count(), 0);
    assert_eq!(f.journal.parker().registered_keys(), 0);
}

#[tokio::test]
async fn test_failed_reads_leave_no_registered_keys() {
    let f = orders_fixture(100, 4);
    for i in 0..1_000 {
        let result = ReadResultSet::new(1, 10).expect("result set");
        let outcome = f
            .journal
            .read_blocking(
                &ObjectNamespace::map(format!("missing-{i}")),
                PartitionId::new(0),
                0,
                result,
            )
            .await;
        assert!(matches!(outcome, Err(JournalError::NotConfigured { .. })));
    }
    assert_eq!(f.journal.parker().registered_keys(), 0);
    assert_eq!(f.store.container_count(), 0);
}

#[tokio::test]
async fn test_timed_out_reader_unregisters_its_key() {
    let f = orders_fixture(100, 4);
    let result = ReadResultSet::new(1, 10).expect("result set");
    let outcome = timeout(
        Duration::from_millis(20),
        f.journal
            .read_blocking(&orders(), PartitionId::new(0), 0, result),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(f.journal.parker().registered_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_completed_readers_unregister_their_key() {
    let f = orders_fixture(100, 4);
    let pid = PartitionId::new(2);

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let journal = Arc::clone(&f.journal);
            tokio::spawn(async move {
                let result = ReadResultSet::new(1, 10).expect("result set");
                journal.read_blocking(&orders(), pid, 0, result).await
            })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(50)).await;
    f.journal.write_add_event(&orders(), pid, "k", "v").expect("write");

    for reader in readers {
        timeout(WAIT, reader)
            .await
            .expect("reader woke")
            .expect("task")
            .expect("read");
    }
    assert_eq!(f.journal.parker().registered_keys(), 0);
}
