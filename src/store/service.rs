//! Registry of journal containers, keyed by namespace and partition.

use super::container::JournalContainer;
use crate::config::StorageConfig;
use crate::instrumentation;
use crate::journal::error::JournalError;
use crate::namespace::{ObjectNamespace, PartitionId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Service name reported when the store has not been registered.
pub const JOURNAL_STORE_SERVICE_NAME: &str = "journal-store";

type ContainerKey = (ObjectNamespace, PartitionId);

/// Owns every journal container on this member.
///
/// Containers are kept in a `DashMap`, and creation goes through its entry
/// API, so concurrent creators for the same key always end up sharing one
/// instance.
pub struct JournalStore<E> {
    containers: DashMap<ContainerKey, Arc<JournalContainer<E>>>,
}

impl<E> JournalStore<E>
where
    E: Clone,
{
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            containers: DashMap::new(),
        }
    }

    /// The existing container at `(namespace, partition_id)`, if any.
    #[must_use]
    pub fn get_container_or_none(
        &self,
        partition_id: PartitionId,
        namespace: &ObjectNamespace,
    ) -> Option<Arc<JournalContainer<E>>> {
        self.containers
            .get(&(namespace.clone(), partition_id))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the container at `(namespace, partition_id)`, creating it
    /// with `config` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidConfig`] if a container has to be
    /// created and `config` is unusable.
    pub fn get_or_create_container(
        &self,
        partition_id: PartitionId,
        namespace: &ObjectNamespace,
        config: &StorageConfig,
    ) -> Result<Arc<JournalContainer<E>>, JournalError> {
        match self.containers.entry((namespace.clone(), partition_id)) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let container = Arc::new(JournalContainer::new(
                    namespace.clone(),
                    partition_id,
                    *config,
                )?);
                entry.insert(Arc::clone(&container));
                debug!(
                    namespace = %namespace,
                    partition = %partition_id,
                    capacity = config.capacity,
                    ttl_seconds = config.time_to_live_seconds,
                    "journal container created"
                );
                instrumentation::record_container_created();
                Ok(container)
            }
        }
    }

    /// Removes the container at `(namespace, partition_id)`. Returns `true`
    /// if one existed.
    ///
    /// Callers still holding the container keep a valid object; later
    /// lookups no longer find it.
    pub fn destroy_container(&self, partition_id: PartitionId, namespace: &ObjectNamespace) -> bool {
        let removed = self
            .containers
            .remove(&(namespace.clone(), partition_id))
            .is_some();
        if removed {
            debug!(namespace = %namespace, partition = %partition_id, "journal container destroyed");
            instrumentation::record_container_destroyed();
        }
        removed
    }

    /// Number of live containers.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Every live container of `partition_id`.
    #[must_use]
    pub fn partition_containers(&self, partition_id: PartitionId) -> Vec<Arc<JournalContainer<E>>> {
        self.containers
            .iter()
            .filter(|entry| entry.key().1 == partition_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl<E> Default for JournalStore<E>
where
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for JournalStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JournalStore")
            .field("containers", &self.containers.len())
            .finish()
    }
}

/// Late-bound handle to the [`JournalStore`].
///
/// The store is registered once during start-up. Until then, lookups
/// fail with [`JournalError::ServiceUnavailable`]. Clones share the same
/// slot.
pub struct StoreHandle<E> {
    slot: Arc<OnceLock<Arc<JournalStore<E>>>>,
}

impl<E> StoreHandle<E> {
    /// A handle with no store registered yet.
    #[must_use]
    pub fn unregistered() -> Self {
        Self {
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// A handle with `store` already registered.
    #[must_use]
    pub fn registered(store: Arc<JournalStore<E>>) -> Self {
        let handle = Self::unregistered();
        let _ = handle.slot.set(store);
        handle
    }

    /// Registers `store`. Returns `false` if a store was already registered.
    pub fn register(&self, store: Arc<JournalStore<E>>) -> bool {
        self.slot.set(store).is_ok()
    }

    /// The registered store.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::ServiceUnavailable`] before registration.
    pub fn get(&self) -> Result<Arc<JournalStore<E>>, JournalError> {
        self.slot
            .get()
            .map(Arc::clone)
            .ok_or(JournalError::ServiceUnavailable {
                service: JOURNAL_STORE_SERVICE_NAME,
            })
    }
}

impl<E> Clone for StoreHandle<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<E> fmt::Debug for StoreHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("registered", &self.slot.get().is_some())
            .finish()
    }
}
