//! Cluster-level collaborators: the negotiated protocol version and the
//! partition topology.
//!
//! The journal only needs two facts from the cluster: the version every
//! member currently speaks (to gate the feature) and the number of
//! partitions (to split a journal's capacity).

use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::info;

/// Partition count used when none is configured.
pub const DEFAULT_PARTITION_COUNT: u32 = 271;

/// A negotiated cluster protocol version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Major component.
    #[must_use]
    pub const fn major(self) -> u8 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(self) -> u8 {
        self.minor
    }

    /// Returns `true` if `self` is strictly older than `other`.
    #[must_use]
    #[inline]
    pub fn is_less_than(self, other: Version) -> bool {
        self < other
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a version string is not of the form `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cluster version {input:?}: expected <major>.<minor>")]
pub struct ParseVersionError {
    input: String,
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            input: s.to_string(),
        };
        let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
        Ok(Version::new(
            major.parse().map_err(|_| err())?,
            minor.parse().map_err(|_| err())?,
        ))
    }
}

/// Source of the cluster-wide negotiated version.
pub trait ClusterVersionSource: Send + Sync + fmt::Debug {
    /// The version every member currently agrees on.
    fn cluster_version(&self) -> Version;
}

/// Source of the partition topology.
pub trait PartitionTopology: Send + Sync + fmt::Debug {
    /// Total number of partitions in the cluster.
    fn partition_count(&self) -> u32;
}

/// Mutable holder of the negotiated cluster version.
///
/// Upgrading the version is immediately visible to every reader, so
/// version-gated features switch on without re-registration.
#[derive(Debug)]
pub struct ClusterState {
    version: RwLock<Version>,
}

impl ClusterState {
    /// Starts at `version`.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version: RwLock::new(version),
        }
    }

    /// Replaces the negotiated version.
    pub fn set_cluster_version(&self, version: Version) {
        let mut guard = self.version.write().unwrap_or_else(PoisonError::into_inner);
        let previous = *guard;
        if previous != version {
            info!(from = %previous, to = %version, "cluster version changed");
            *guard = version;
        }
    }
}

impl ClusterVersionSource for ClusterState {
    fn cluster_version(&self) -> Version {
        *self.version.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A topology with a fixed number of partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPartitionTopology {
    partition_count: u32,
}

impl FixedPartitionTopology {
    /// A topology with `partition_count` partitions.
    #[must_use]
    pub const fn new(partition_count: u32) -> Self {
        Self { partition_count }
    }
}

impl Default for FixedPartitionTopology {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_COUNT)
    }
}

impl PartitionTopology for FixedPartitionTopology {
    fn partition_count(&self) -> u32 {
        self.partition_count
    }
}
