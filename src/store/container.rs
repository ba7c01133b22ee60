//! A single partition's journal container.

use super::read_result::ReadResultSet;
use super::ringbuffer::ArrayRingbuffer;
use crate::config::StorageConfig;
use crate::journal::error::JournalError;
use crate::namespace::{ObjectNamespace, PartitionId, WaitKey};
use crate::parker::Notifier;
use crate::utils::current_time_millis;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Bounded, sequence-numbered log for one `(namespace, partition)`.
///
/// All state sits behind a single lock, so every query observes head and
/// tail from the same moment. Writers are expected to be serialized per
/// partition by the caller; the lock only guarantees that concurrent
/// readers never see a half-applied append.
#[derive(Debug)]
pub struct JournalContainer<E> {
    key: WaitKey,
    config: StorageConfig,
    ring: RwLock<ArrayRingbuffer<E>>,
}

impl<E> JournalContainer<E>
where
    E: Clone,
{
    /// Creates an empty container.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidConfig`] if `config.capacity` is zero.
    pub fn new(
        namespace: ObjectNamespace,
        partition_id: PartitionId,
        config: StorageConfig,
    ) -> Result<Self, JournalError> {
        if config.capacity == 0 {
            return Err(JournalError::InvalidConfig {
                message: format!(
                    "journal container {namespace} partition {partition_id} needs a positive capacity"
                ),
            });
        }
        Ok(Self {
            key: WaitKey::new(namespace, partition_id),
            ring: RwLock::new(ArrayRingbuffer::new(config.capacity)),
            config,
        })
    }

    fn read_ring(&self) -> Result<RwLockReadGuard<'_, ArrayRingbuffer<E>>, JournalError> {
        self.ring.read().map_err(|_| JournalError::LockPoisoned)
    }

    fn write_ring(&self) -> Result<RwLockWriteGuard<'_, ArrayRingbuffer<E>>, JournalError> {
        self.ring.write().map_err(|_| JournalError::LockPoisoned)
    }

    /// Namespace this container belongs to.
    #[must_use]
    pub fn namespace(&self) -> &ObjectNamespace {
        self.key.namespace()
    }

    /// Partition this container belongs to.
    #[must_use]
    pub fn partition_id(&self) -> PartitionId {
        self.key.partition_id()
    }

    /// Storage configuration the container was created with.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Oldest retained sequence.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn head_sequence(&self) -> Result<i64, JournalError> {
        Ok(self.read_ring()?.head_sequence())
    }

    /// Most recently written sequence; `-1` before the first write.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn tail_sequence(&self) -> Result<i64, JournalError> {
        Ok(self.read_ring()?.tail_sequence())
    }

    /// Number of retained records.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn size(&self) -> Result<u64, JournalError> {
        Ok(self.read_ring()?.size().max(0) as u64)
    }

    /// Returns `true` when no records are retained.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, JournalError> {
        Ok(self.size()? == 0)
    }

    /// Free slots before the next append evicts the head.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn remaining_capacity(&self) -> Result<u64, JournalError> {
        let ring = self.read_ring()?;
        Ok((ring.capacity() - ring.size()).max(0) as u64)
    }

    /// Appends `item` and returns its sequence.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn add(&self, item: E) -> Result<i64, JournalError> {
        self.add_at(item, current_time_millis())
    }

    /// Appends `item` as if the wall clock read `now_millis`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn add_at(&self, item: E, now_millis: u64) -> Result<i64, JournalError> {
        let expires_at = self
            .config
            .has_time_to_live()
            .then(|| now_millis.saturating_add(u64::from(self.config.time_to_live_seconds) * 1000));
        let sequence = self.write_ring()?.add(item, expires_at);
        trace!(key = %self.key, sequence, "journal record appended");
        Ok(sequence)
    }

    /// Reads the record at `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::StaleSequence`] or
    /// [`JournalError::SequenceTooLarge`] if `sequence` is not retained.
    pub fn read_one(&self, sequence: i64) -> Result<E, JournalError> {
        let ring = self.read_ring()?;
        if sequence > ring.tail_sequence() {
            return Err(JournalError::SequenceTooLarge {
                sequence,
                tail_sequence: ring.tail_sequence(),
            });
        }
        ring.read(sequence)
            .cloned()
            .ok_or(JournalError::StaleSequence {
                sequence,
                head_sequence: ring.head_sequence(),
            })
    }

    /// Checks that `sequence` is readable now or is exactly the next one to
    /// be written (`head <= sequence <= tail + 1`).
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::SequenceTooLarge`] past `tail + 1` and
    /// [`JournalError::StaleSequence`] before `head`.
    pub fn check_blockable_read_sequence(&self, sequence: i64) -> Result<(), JournalError> {
        let ring = self.read_ring()?;
        check_blockable(&ring, sequence)
    }

    /// Returns `true` if `sequence` has not been written yet, meaning a
    /// reader has to wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn should_wait(&self, sequence: i64) -> Result<bool, JournalError> {
        Ok(sequence > self.read_ring()?.tail_sequence())
    }

    /// Reads from `begin_sequence` towards the tail into `result`, stopping
    /// early when the result set is full. Returns the number of records
    /// visited.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error if `begin_sequence` fails
    /// [`check_blockable_read_sequence`](Self::check_blockable_read_sequence).
    pub fn read_many<R>(
        &self,
        begin_sequence: i64,
        result: &mut ReadResultSet<E, R>,
    ) -> Result<u64, JournalError> {
        let ring = self.read_ring()?;
        check_blockable(&ring, begin_sequence)?;

        let mut sequence = begin_sequence;
        let mut read = 0;
        while sequence <= ring.tail_sequence() && !result.is_max_size_reached() {
            if let Some(item) = ring.read(sequence) {
                result.add_item(sequence, item);
                read += 1;
            }
            sequence += 1;
        }
        result.set_next_sequence_to_read(sequence);
        Ok(read)
    }

    /// Drops expired records from the head using the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn cleanup(&self) -> Result<u64, JournalError> {
        self.cleanup_expired(current_time_millis())
    }

    /// Drops records that expired at or before `now_millis`. Returns how
    /// many were dropped. A no-op when the container has no time-to-live.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LockPoisoned`] if the container lock is poisoned.
    pub fn cleanup_expired(&self, now_millis: u64) -> Result<u64, JournalError> {
        if !self.config.has_time_to_live() {
            return Ok(0);
        }
        let evicted = self.write_ring()?.evict_expired(now_millis);
        if evicted > 0 {
            trace!(key = %self.key, evicted, "expired journal records dropped");
        }
        Ok(evicted)
    }
}

impl<E> Notifier for JournalContainer<E> {
    fn notified_key(&self) -> &WaitKey {
        &self.key
    }
}

fn check_blockable<E>(ring: &ArrayRingbuffer<E>, sequence: i64) -> Result<(), JournalError> {
    if sequence > ring.tail_sequence() + 1 {
        return Err(JournalError::SequenceTooLarge {
            sequence,
            tail_sequence: ring.tail_sequence(),
        });
    }
    if sequence < ring.head_sequence() {
        return Err(JournalError::StaleSequence {
            sequence,
            head_sequence: ring.head_sequence(),
        });
    }
    Ok(())
}
