/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Prelude module that re-exports commonly used types and traits.
//!
//! ```rust
//! use map_event_journal::prelude::*;
//! ```
//!
//! This imports everything needed to wire up a [`JournalCoordinator`],
//! write events and read them back.

// Coordinator and journal contract
pub use crate::journal::{
    ConfigResolver, EventRecord, EventType, InitialSubscriberState, JournalCoordinator,
    JournalError, MIN_EVENT_JOURNAL_VERSION, MapEvent, MapEventJournal,
};

// Identity types
pub use crate::namespace::{ObjectNamespace, PartitionId, WaitKey};

// Configuration
pub use crate::config::{JournalConfig, JournalConfigRegistry, JournalSettings, StorageConfig};

// Cluster collaborators
pub use crate::cluster::{
    ClusterState, ClusterVersionSource, FixedPartitionTopology, PartitionTopology, Version,
};

// Storage engine
pub use crate::store::{JournalContainer, JournalStore, ReadResultSet, StoreHandle};

// Blocking reads
pub use crate::parker::WaitRegistry;

// Serialization
#[cfg(feature = "bincode")]
pub use crate::serialization::BincodeWireSerializer;
pub use crate::serialization::{Data, JsonWireSerializer, WireSerializer};
