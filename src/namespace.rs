//! Identity types shared by every journal component.
//!
//! A journal is addressed by an [`ObjectNamespace`] (which service owns the
//! object, and the object's name) together with a [`PartitionId`]. The same
//! pair, wrapped as a [`WaitKey`], is what blocked readers park on.

use std::fmt;
use std::sync::Arc;

/// Service name used by namespaces that belong to the key-value map service.
pub const MAP_SERVICE_NAME: &str = "map-service";

/// Identifies the logical owner of a journal: a `(service, object)` pair.
///
/// Both parts are reference counted, so cloning a namespace to build a
/// lookup key is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectNamespace {
    service_name: Arc<str>,
    object_name: Arc<str>,
}

impl ObjectNamespace {
    /// Creates a namespace for an object owned by `service_name`.
    #[must_use]
    pub fn new(service_name: impl Into<Arc<str>>, object_name: impl Into<Arc<str>>) -> Self {
        Self {
            service_name: service_name.into(),
            object_name: object_name.into(),
        }
    }

    /// Creates a namespace for a map named `object_name`.
    #[must_use]
    pub fn map(object_name: impl Into<Arc<str>>) -> Self {
        Self::new(MAP_SERVICE_NAME, object_name)
    }

    /// The owning service.
    #[must_use]
    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The object name. Journal configuration is looked up by this name.
    #[must_use]
    #[inline]
    pub fn object_name(&self) -> &str {
        &self.object_name
    }
}

impl fmt::Display for ObjectNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_name, self.object_name)
    }
}

/// Identifier of a data partition. Each partition owns an independent journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(u32);

impl PartitionId {
    /// Wraps a raw partition number.
    #[must_use]
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw partition number.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PartitionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque key that readers park on while waiting for new journal entries.
///
/// Derived deterministically from a namespace and partition, so a writer
/// and a reader addressing the same journal always agree on the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaitKey {
    namespace: ObjectNamespace,
    partition_id: PartitionId,
}

impl WaitKey {
    /// Builds the wait key for the journal at `(namespace, partition_id)`.
    #[must_use]
    pub fn new(namespace: ObjectNamespace, partition_id: PartitionId) -> Self {
        Self {
            namespace,
            partition_id,
        }
    }

    /// Namespace of the journal this key belongs to.
    #[must_use]
    pub fn namespace(&self) -> &ObjectNamespace {
        &self.namespace
    }

    /// Partition of the journal this key belongs to.
    #[must_use]
    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }
}

impl fmt::Display for WaitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "journal-wait[{}/{}]", self.namespace, self.partition_id)
    }
}
