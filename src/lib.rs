//! # Map Event Journal
//!
//! A per-partition event journal for a partitioned key-value map. The
//! journal is an append-only, bounded, sequence-numbered log of mutation
//! events (add, update, remove, evict). Change-data-capture pipelines and
//! replicated listeners read it by sequence number, including blocking reads
//! that wait for events that have not been written yet.
//!
//! ## Key Features
//!
//! - **Lazy Journals**: A journal for `(map, partition)` is materialized on
//!   the first write or query against an enabled configuration. Creation is
//!   atomic per key, so concurrent first callers share a single instance.
//!
//! - **Zero-Cost When Disabled**: Writes to a disabled or unconfigured
//!   journal return immediately without serializing anything, so the map
//!   can call them unconditionally.
//!
//! - **Version Gating**: Journals stay disabled cluster-wide until the
//!   negotiated cluster version reaches [`MIN_EVENT_JOURNAL_VERSION`], and
//!   switch on automatically after an upgrade.
//!
//! - **Bounded Retention**: Each partition's ring holds
//!   `capacity / partition_count` records and optionally expires records by
//!   time-to-live. Sequence numbers are never reused.
//!
//! - **Blocking Reads Without Threads**: Readers park an async task on the
//!   journal's wait key and are woken by the next write.
//!
//! ## Architecture
//!
//! | Component | Module |
//! |-----------|--------|
//! | Event record | [`journal::event`] |
//! | Storage engine | [`store`] |
//! | Wait/notify registry | [`parker`] |
//! | Configuration resolver | [`journal::resolver`] |
//! | Coordinator facade | [`journal::coordinator`] |
//! | Subscriptions and blocking reads | [`journal::reader`] |
//!
//! Collaborators (configuration registry, cluster version, partition
//! topology, wire serializer) are traits with in-memory implementations in
//! [`config`], [`cluster`] and [`serialization`].
//!
//! ## Example
//!
//! ```
//! use map_event_journal::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = JournalSettings::new()
//!     .with_journal("orders", JournalConfig::enabled_with_capacity(100))
//!     .expect("valid config");
//! let journal = JournalCoordinator::new(
//!     ConfigResolver::new(
//!         Arc::new(settings),
//!         Arc::new(ClusterState::new(MIN_EVENT_JOURNAL_VERSION)),
//!         Arc::new(FixedPartitionTopology::new(4)),
//!     ),
//!     StoreHandle::registered(Arc::new(JournalStore::new())),
//!     Arc::new(WaitRegistry::new()),
//!     JsonWireSerializer::new(),
//! );
//!
//! let orders = ObjectNamespace::map("orders");
//! let partition = PartitionId::new(0);
//!
//! journal.write_add_event(&orders, partition, "order-1", &10u32).expect("write");
//! journal.write_update_event(&orders, partition, "order-1", &10u32, &12u32).expect("write");
//!
//! assert_eq!(journal.oldest_sequence(&orders, partition).expect("journal"), 0);
//! assert_eq!(journal.newest_sequence(&orders, partition).expect("journal"), 1);
//!
//! // writes to maps without a journal are silently dropped
//! let trades = ObjectNamespace::map("trades");
//! journal.write_add_event(&trades, partition, "t-1", &1u32).expect("no-op");
//! assert!(!journal.has_event_journal(&trades));
//! ```
//!
//! ## Feature Flags
//!
//! - `bincode`: enables `BincodeWireSerializer`.
//! - `metrics`: exports write and container counters through the
//!   `metrics` facade (see [`instrumentation`]).

pub mod cluster;
pub mod config;
pub mod instrumentation;
pub mod journal;
pub mod namespace;
pub mod parker;
pub mod prelude;
pub mod serialization;
pub mod store;
mod utils;

pub use cluster::{
    ClusterState, ClusterVersionSource, FixedPartitionTopology, PartitionTopology, Version,
};
pub use config::{
    ConfigError, InMemoryFormat, JournalConfig, JournalConfigRegistry, JournalSettings,
    StorageConfig,
};
pub use journal::{
    ConfigResolver, EventContainer, EventRecord, EventType, InitialSubscriberState,
    JournalCoordinator, JournalError, MIN_EVENT_JOURNAL_VERSION, MapEvent, MapEventJournal,
    to_storage_config,
};
pub use namespace::{MAP_SERVICE_NAME, ObjectNamespace, PartitionId, WaitKey};
pub use parker::{Notifier, WaitRegistry, Waiter};
#[cfg(feature = "bincode")]
pub use serialization::BincodeWireSerializer;
pub use serialization::{Data, JsonWireSerializer, SerializationError, WireSerializer};
pub use store::{JournalContainer, JournalStore, ReadResultSet, StoreHandle};
