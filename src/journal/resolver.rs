//! Version-gated journal configuration lookup.
//!
//! A journal only exists when every member of the cluster knows how to
//! record and replay journal events. Below [`MIN_EVENT_JOURNAL_VERSION`]
//! the resolver reports no configuration at all, which makes the journal
//! indistinguishable from an unconfigured one. Raising the cluster version
//! switches journals on without any re-registration.

use super::error::JournalError;
use crate::cluster::{ClusterVersionSource, PartitionTopology, Version};
use crate::config::{InMemoryFormat, JournalConfig, JournalConfigRegistry, StorageConfig};
use crate::namespace::ObjectNamespace;
use std::sync::Arc;
use tracing::warn;

/// First cluster version that supports per-map event journals.
pub const MIN_EVENT_JOURNAL_VERSION: Version = Version::new(3, 9);

/// Resolves journal configuration from the registry, the cluster version
/// and the partition topology.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    registry: Arc<dyn JournalConfigRegistry>,
    cluster: Arc<dyn ClusterVersionSource>,
    topology: Arc<dyn PartitionTopology>,
}

impl ConfigResolver {
    /// Builds a resolver over the given collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<dyn JournalConfigRegistry>,
        cluster: Arc<dyn ClusterVersionSource>,
        topology: Arc<dyn PartitionTopology>,
    ) -> Self {
        Self {
            registry,
            cluster,
            topology,
        }
    }

    /// The journal config for `namespace`, or `None` when the cluster is
    /// too old or nothing is registered for the object.
    #[must_use]
    pub fn resolve_config(&self, namespace: &ObjectNamespace) -> Option<JournalConfig> {
        if self
            .cluster
            .cluster_version()
            .is_less_than(MIN_EVENT_JOURNAL_VERSION)
        {
            return None;
        }
        self.registry.find_journal_config(namespace.object_name())
    }

    /// Returns `true` iff the resolved config exists and is enabled.
    #[must_use]
    pub fn is_enabled(&self, namespace: &ObjectNamespace) -> bool {
        self.resolve_config(namespace)
            .is_some_and(|config| config.enabled)
    }

    /// Current partition count.
    #[must_use]
    pub fn partition_count(&self) -> u32 {
        self.topology.partition_count()
    }

    /// Translates `config` using the live partition count.
    ///
    /// # Errors
    ///
    /// See [`to_storage_config`].
    pub fn storage_config_for(&self, config: &JournalConfig) -> Result<StorageConfig, JournalError> {
        to_storage_config(config, self.partition_count())
    }
}

/// Derives the per-partition storage configuration.
///
/// Capacity is split evenly with integer division; the remainder is
/// dropped. The time-to-live is copied as is, and journals never have
/// backups.
///
/// # Errors
///
/// Returns [`JournalError::InvalidConfig`] if `partition_count` is zero or
/// the split leaves no capacity per partition.
pub fn to_storage_config(
    config: &JournalConfig,
    partition_count: u32,
) -> Result<StorageConfig, JournalError> {
    let Some(capacity) = config.capacity.checked_div(partition_count) else {
        return Err(JournalError::InvalidConfig {
            message: "partition count must be positive".to_string(),
        });
    };
    if capacity == 0 {
        warn!(
            capacity = config.capacity,
            partition_count, "journal capacity is smaller than the partition count"
        );
        return Err(JournalError::InvalidConfig {
            message: format!(
                "journal capacity {} leaves no room across {partition_count} partitions",
                config.capacity
            ),
        });
    }
    Ok(StorageConfig {
        capacity,
        time_to_live_seconds: config.time_to_live_seconds,
        backup_count: 0,
        async_backup_count: 0,
        in_memory_format: InMemoryFormat::Object,
    })
}
