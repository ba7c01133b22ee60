//! Property tests for capacity splitting and ring sequencing.

use super::test_helpers::{fixture, orders};
use map_event_journal::prelude::*;
use map_event_journal::to_storage_config;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_storage_capacity_is_integer_split(
        capacity in 1u32..1_000_000,
        partitions in 1u32..1_000,
        ttl in 0u32..86_400,
    ) {
        let config = JournalConfig::enabled_with_capacity(capacity).with_time_to_live_seconds(ttl);
        match to_storage_config(&config, partitions) {
            Ok(storage) => {
                prop_assert_eq!(storage.capacity, capacity / partitions);
                prop_assert!(storage.capacity > 0);
                prop_assert_eq!(storage.time_to_live_seconds, ttl);
                prop_assert_eq!(storage.backup_count, 0);
                prop_assert_eq!(storage.async_backup_count, 0);
            }
            Err(err) => {
                prop_assert!(capacity < partitions);
                prop_assert!(
                    matches!(err, JournalError::InvalidConfig { .. }),
                    "unexpected error {:?}",
                    err
                );
            }
        }
    }

    #[test]
    fn test_sequences_increase_and_stay_bounded(
        per_partition in 1u32..32,
        writes in 0usize..200,
    ) {
        let settings = JournalSettings::new()
            .with_journal("orders", JournalConfig::enabled_with_capacity(per_partition * 2))
            .expect("config");
        let f = fixture(settings, 2, MIN_EVENT_JOURNAL_VERSION);
        let pid = PartitionId::new(1);

        let mut previous = f.journal.newest_sequence(&orders(), pid).expect("journal");
        prop_assert_eq!(previous, -1);

        for i in 0..writes {
            f.journal.write_add_event(&orders(), pid, &i, &i).expect("write");
            let newest = f.journal.newest_sequence(&orders(), pid).expect("journal");
            let oldest = f.journal.oldest_sequence(&orders(), pid).expect("journal");
            prop_assert_eq!(newest, previous + 1);
            prop_assert!(oldest <= newest + 1);
            prop_assert!(newest - oldest + 1 <= i64::from(per_partition));
            previous = newest;
        }

        let container = f.store.get_container_or_none(pid, &orders()).expect("container");
        let expected_size = writes.min(per_partition as usize) as u64;
        prop_assert_eq!(container.size().expect("size"), expected_size);
    }
}
