/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! The journal coordinator: the single entry point the map uses to record
//! mutations and consumers use to query and read journals.

use super::error::JournalError;
use super::event::{EventRecord, EventType};
use super::resolver::ConfigResolver;
use crate::config::{JournalConfig, StorageConfig};
use crate::instrumentation;
use crate::namespace::{ObjectNamespace, PartitionId, WaitKey};
use crate::parker::WaitRegistry;
use crate::serialization::{Data, JsonWireSerializer, WireSerializer};
use crate::store::{JournalContainer, ReadResultSet, StoreHandle};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Container type used for map event journals.
pub type EventContainer = JournalContainer<EventRecord>;

/// Per-partition event journal of a key-value map.
///
/// Every operation addresses one journal by `(namespace, partition_id)`.
/// Journals are created lazily by the first write or query against an
/// enabled configuration.
///
/// # Absent journals
///
/// When the journal is disabled, unregistered, or the cluster is below the
/// minimum feature version:
///
/// - writes are silent no-ops, so the map can call them unconditionally;
/// - sequence queries, availability checks, reads and cleanup fail with
///   [`JournalError::NotConfigured`];
/// - [`has_event_journal`](Self::has_event_journal) returns `false`.
///
/// # Thread Safety
///
/// Writes to one partition are expected to come from a single execution
/// lane. Reads may run concurrently with each other and with writes.
pub trait MapEventJournal: Send + Sync {
    /// Records that `key` changed from `old_value` to `new_value`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if serialization or the append fails.
    fn write_update_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        old_value: &V,
        new_value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized;

    /// Records that `key` was added with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if serialization or the append fails.
    fn write_add_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized;

    /// Records that `key`, holding `value`, was removed.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if serialization or the append fails.
    fn write_remove_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized;

    /// Records that `key`, holding `value`, was evicted.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if serialization or the append fails.
    fn write_evict_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized;

    /// Sequence of the most recently written event (`-1` before the first).
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal.
    fn newest_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<i64, JournalError>;

    /// Sequence of the oldest retained event.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal.
    fn oldest_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<i64, JournalError>;

    /// Best-effort teardown of the journal.
    ///
    /// Never fails: if the storage service is not available yet the
    /// condition is logged and the call returns. Readers blocked on the
    /// journal are woken and fail with [`JournalError::Destroyed`].
    fn destroy(&self, namespace: &ObjectNamespace, partition_id: PartitionId);

    /// Checks that `sequence` is readable now or is exactly the next one to
    /// be written.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal, and
    /// [`JournalError::SequenceTooLarge`] or [`JournalError::StaleSequence`]
    /// if waiting can never make `sequence` readable.
    fn is_available_or_next_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        sequence: i64,
    ) -> Result<(), JournalError>;

    /// Returns `true` if `sequence` has not been written yet and the reader
    /// should park on [`wait_notify_key`](Self::wait_notify_key).
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal.
    fn is_next_available_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        sequence: i64,
    ) -> Result<bool, JournalError>;

    /// Key that readers of this journal park on.
    fn wait_notify_key(&self, namespace: &ObjectNamespace, partition_id: PartitionId) -> WaitKey;

    /// Reads from `begin_sequence` into `result`. Returns the number of
    /// records visited.
    ///
    /// Callers validate `begin_sequence` with
    /// [`is_available_or_next_sequence`](Self::is_available_or_next_sequence)
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal, or an
    /// out-of-range error if `begin_sequence` is no longer valid.
    fn read_many<R>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        begin_sequence: i64,
        result: &mut ReadResultSet<EventRecord, R>,
    ) -> Result<u64, JournalError>;

    /// Runs TTL eviction on the journal.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotConfigured`] if there is no journal.
    fn cleanup(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<(), JournalError>;

    /// Returns `true` if `namespace` has an enabled journal. Looks at
    /// configuration only, never at storage.
    fn has_event_journal(&self, namespace: &ObjectNamespace) -> bool;

    /// The resolved journal configuration of `namespace`, if any.
    fn event_journal_config(&self, namespace: &ObjectNamespace) -> Option<JournalConfig>;

    /// Per-partition storage configuration for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidConfig`] if `config` cannot be split
    /// across the current partitions.
    fn to_storage_config(&self, config: &JournalConfig) -> Result<StorageConfig, JournalError>;
}

/// [`MapEventJournal`] backed by ring-buffer containers.
#[derive(Debug)]
pub struct JournalCoordinator<S = JsonWireSerializer> {
    resolver: ConfigResolver,
    store: StoreHandle<EventRecord>,
    parker: Arc<WaitRegistry>,
    serializer: S,
}

impl<S> JournalCoordinator<S>
where
    S: WireSerializer,
{
    /// Builds a coordinator over its collaborators.
    #[must_use]
    pub fn new(
        resolver: ConfigResolver,
        store: StoreHandle<EventRecord>,
        parker: Arc<WaitRegistry>,
        serializer: S,
    ) -> Self {
        Self {
            resolver,
            store,
            parker,
            serializer,
        }
    }

    /// The configuration resolver.
    #[must_use]
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// The wait registry readers park on.
    #[must_use]
    pub fn parker(&self) -> &Arc<WaitRegistry> {
        &self.parker
    }

    /// The wire serializer applied to keys and values.
    #[must_use]
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// The existing container, a freshly created one if the journal is
    /// enabled, or `None` if it is not.
    fn container_or_none(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<Option<Arc<EventContainer>>, JournalError> {
        let store = self.store.get()?;
        if let Some(container) = store.get_container_or_none(partition_id, namespace) {
            return Ok(Some(container));
        }

        let Some(config) = self
            .resolver
            .resolve_config(namespace)
            .filter(|config| config.enabled)
        else {
            return Ok(None);
        };
        let storage = self.resolver.storage_config_for(&config)?;
        store
            .get_or_create_container(partition_id, namespace, &storage)
            .map(Some)
    }

    fn container_or_fail(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<Arc<EventContainer>, JournalError> {
        self.container_or_none(namespace, partition_id)?
            .ok_or_else(|| JournalError::NotConfigured {
                object_name: namespace.object_name().to_string(),
            })
    }

    fn to_data<V>(&self, value: &V) -> Result<Data, JournalError>
    where
        V: Serialize + ?Sized,
    {
        Ok(self.serializer.to_data(value)?)
    }

    /// Appends `build(..)` to the journal and unparks its readers. Does
    /// nothing when the journal is absent.
    fn append_event<F>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        event_type: EventType,
        build: F,
    ) -> Result<(), JournalError>
    where
        F: FnOnce(&Self) -> Result<EventRecord, JournalError>,
    {
        let Some(container) = self.container_or_none(namespace, partition_id)? else {
            return Ok(());
        };
        let record = build(self)?;
        let sequence = container.add(record)?;
        trace!(
            namespace = %namespace,
            partition = %partition_id,
            event_type = %event_type,
            sequence,
            "journal event written"
        );
        instrumentation::record_write(event_type);
        self.parker.unpark(container.as_ref());
        Ok(())
    }
}

impl<S> MapEventJournal for JournalCoordinator<S>
where
    S: WireSerializer,
{
    fn write_update_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        old_value: &V,
        new_value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.append_event(namespace, partition_id, EventType::Updated, |this| {
            Ok(EventRecord::updated(
                this.to_data(key)?,
                this.to_data(old_value)?,
                this.to_data(new_value)?,
            ))
        })
    }

    fn write_add_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.append_event(namespace, partition_id, EventType::Added, |this| {
            Ok(EventRecord::added(this.to_data(key)?, this.to_data(value)?))
        })
    }

    fn write_remove_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.append_event(namespace, partition_id, EventType::Removed, |this| {
            Ok(EventRecord::removed(this.to_data(key)?, this.to_data(value)?))
        })
    }

    fn write_evict_event<K, V>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        key: &K,
        value: &V,
    ) -> Result<(), JournalError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.append_event(namespace, partition_id, EventType::Evicted, |this| {
            Ok(EventRecord::evicted(this.to_data(key)?, this.to_data(value)?))
        })
    }

    fn newest_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<i64, JournalError> {
        self.container_or_fail(namespace, partition_id)?
            .tail_sequence()
    }

    fn oldest_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<i64, JournalError> {
        self.container_or_fail(namespace, partition_id)?
            .head_sequence()
    }

    fn destroy(&self, namespace: &ObjectNamespace, partition_id: PartitionId) {
        let store = match self.store.get() {
            Ok(store) => store,
            Err(err) => {
                debug!(
                    namespace = %namespace,
                    partition = %partition_id,
                    error = %err,
                    "could not retrieve journal store to destroy event journal"
                );
                return;
            }
        };
        store.destroy_container(partition_id, namespace);
        self.parker
            .cancel(&self.wait_notify_key(namespace, partition_id));
    }

    fn is_available_or_next_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        sequence: i64,
    ) -> Result<(), JournalError> {
        self.container_or_fail(namespace, partition_id)?
            .check_blockable_read_sequence(sequence)
    }

    fn is_next_available_sequence(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        sequence: i64,
    ) -> Result<bool, JournalError> {
        self.container_or_fail(namespace, partition_id)?
            .should_wait(sequence)
    }

    fn wait_notify_key(&self, namespace: &ObjectNamespace, partition_id: PartitionId) -> WaitKey {
        WaitKey::new(namespace.clone(), partition_id)
    }

    fn read_many<R>(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
        begin_sequence: i64,
        result: &mut ReadResultSet<EventRecord, R>,
    ) -> Result<u64, JournalError> {
        self.container_or_fail(namespace, partition_id)?
            .read_many(begin_sequence, result)
    }

    fn cleanup(
        &self,
        namespace: &ObjectNamespace,
        partition_id: PartitionId,
    ) -> Result<(), JournalError> {
        self.container_or_fail(namespace, partition_id)?
            .cleanup()
            .map(|_| ())
    }

    fn has_event_journal(&self, namespace: &ObjectNamespace) -> bool {
        self.resolver.is_enabled(namespace)
    }

    fn event_journal_config(&self, namespace: &ObjectNamespace) -> Option<JournalConfig> {
        self.resolver.resolve_config(namespace)
    }

    fn to_storage_config(&self, config: &JournalConfig) -> Result<StorageConfig, JournalError> {
        self.resolver.storage_config_for(config)
    }
}
