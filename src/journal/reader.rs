//! Consumer-side operations: subscribing to a journal and blocking reads.
//!
//! A consumer first [`subscribe`](JournalCoordinator::subscribe)s to learn
//! the retained sequence range, then repeatedly calls
//! [`read_blocking`](JournalCoordinator::read_blocking) starting from the
//! sequence after the last one it processed.
//!
//! ```
//! use map_event_journal::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = JournalSettings::new()
//!     .with_journal("orders", JournalConfig::enabled_with_capacity(1_000))?;
//! let journal = JournalCoordinator::new(
//!     ConfigResolver::new(
//!         Arc::new(settings),
//!         Arc::new(ClusterState::new(MIN_EVENT_JOURNAL_VERSION)),
//!         Arc::new(FixedPartitionTopology::new(10)),
//!     ),
//!     StoreHandle::registered(Arc::new(JournalStore::new())),
//!     Arc::new(WaitRegistry::new()),
//!     JsonWireSerializer::new(),
//! );
//!
//! let orders = ObjectNamespace::map("orders");
//! let partition = PartitionId::new(3);
//! let state = journal.subscribe(&orders, partition)?;
//!
//! journal.write_add_event(&orders, partition, "order-1", &100u64)?;
//!
//! let batch = tokio::time::timeout(
//!     Duration::from_secs(1),
//!     journal.read_blocking(&orders, partition, state.newest_sequence + 1, ReadResultSet::new(1, 100)?),
//! )
//! .await??;
//! assert_eq!(batch.len(), 1);
//! # Ok(())
//! # }
//! ```

use super::coordinator::{JournalCoordinator, MapEventJournal};
use super::error::JournalError;
use super::event::EventRecord;
use crate::namespace::{ObjectNamespace, PartitionId};
use crate::serialization::WireSerializer;
use crate::store::ReadResultSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Retained sequence range at the moment a consumer subscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSubscriberState {
    /// Oldest sequence still retained.
    pub oldest_sequence: i64,
    /// Most recently written sequence (`-1` if nothing was written yet).
    pub newest_sequence: i64,
}

impl<S> JournalCoordinator<S>
where
    S: WireSerializer,
{
    /// Returns the journal's current sequence range.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal.
    pub fn subscribe(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<InitialSubscriberState, JournalError> {
        Ok(InitialSubscriberState {
            oldest_sequence: self.oldest_sequence(namespace, partition_id)?,
            newest_sequence: self.newest_sequence(namespace, partition_id)?,
        })
    }

    /// Reads from `start_sequence`, parking until records are written.
    ///
    /// Completes once the result set holds at least its `min_size` items
    /// and the reader has caught up with the tail, or once it holds
    /// `max_size` items. With `min_size == 0` it returns as soon as it has
    /// caught up, even with nothing read.
    ///
    /// There is no built-in timeout; wrap the future in
    /// `tokio::time::timeout` or drop it to cancel.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal,
    /// [`JournalError::Destroyed`] if the journal is destroyed while the
    /// reader is registered, and an out-of-range error if `start_sequence`
    /// (or, after a wait, the next sequence to read) is not reachable.
    pub async fn read_blocking<R>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        start_sequence: i64,
        mut result: ReadResultSet<EventRecord, R>,
    ) -> Result<ReadResultSet<EventRecord, R>, JournalError> {
        let waiter = self
            .parker()
            .waiter(&self.wait_notify_key(namespace, partition_id));
        let mut sequence = start_sequence;

        loop {
            let notified = waiter.notified();

            // a destroyed journal must not be recreated by its own readers
            if waiter.is_cancelled() {
                return Err(JournalError::Destroyed {
                    object_name: namespace.object_name().to_string(),
                    partition_id,
                });
            }
            self.is_available_or_next_sequence(namespace, partition_id, sequence)?;
            if self.is_next_available_sequence(namespace, partition_id, sequence)? {
                if result.is_min_size_reached() {
                    return Ok(result);
                }
                trace!(
                    namespace = %namespace,
                    partition = %partition_id,
                    sequence,
                    "parking journal reader"
                );
                notified.await;
                continue;
            }

            self.read_many(namespace, partition_id, sequence, &mut result)?;
            sequence = result.next_sequence_to_read();
            if result.is_max_size_reached() {
                return Ok(result);
            }
        }
    }
}
