//! Accumulator for batched journal reads.

use crate::journal::error::JournalError;
use std::fmt;

type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;
type Projection<E, R> = Box<dyn Fn(&E) -> R + Send + Sync>;

/// Collects records visited by a batched read.
///
/// Every visited record counts towards [`read_count`](Self::read_count).
/// Records rejected by the predicate are skipped but still advance
/// [`next_sequence_to_read`](Self::next_sequence_to_read). Kept records are
/// passed through the projection and stored with their sequence.
///
/// A read stops once `max_size` items are kept. A blocking reader keeps
/// waiting until at least `min_size` items are kept.
pub struct ReadResultSet<E, R = E> {
    min_size: usize,
    max_size: usize,
    predicate: Option<Predicate<E>>,
    projection: Projection<E, R>,
    items: Vec<R>,
    sequences: Vec<i64>,
    read_count: u64,
    next_sequence_to_read: i64,
}

impl<E> ReadResultSet<E, E>
where
    E: Clone + 'static,
{
    /// A result set that keeps the records themselves.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidReadRequest`] if `max_size` is zero or
    /// smaller than `min_size`.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self, JournalError> {
        Self::projected(min_size, max_size, E::clone)
    }
}

impl<E, R> ReadResultSet<E, R> {
    /// A result set that keeps `projection(record)` for each kept record.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidReadRequest`] if `max_size` is zero or
    /// smaller than `min_size`.
    pub fn projected<F>(min_size: usize, max_size: usize, projection: F) -> Result<Self, JournalError>
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        if max_size == 0 {
            return Err(JournalError::InvalidReadRequest {
                message: "max_size must be positive".to_string(),
            });
        }
        if min_size > max_size {
            return Err(JournalError::InvalidReadRequest {
                message: format!("min_size {min_size} is larger than max_size {max_size}"),
            });
        }
        Ok(Self {
            min_size,
            max_size,
            predicate: None,
            projection: Box::new(projection),
            items: Vec::with_capacity(max_size.min(1024)),
            sequences: Vec::with_capacity(max_size.min(1024)),
            read_count: 0,
            next_sequence_to_read: 0,
        })
    }

    /// Keeps only records for which `predicate` returns `true`.
    #[must_use]
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Offers the record at `sequence`.
    pub(crate) fn add_item(&mut self, sequence: i64, item: &E) {
        self.read_count += 1;
        self.next_sequence_to_read = sequence + 1;
        if self.predicate.as_ref().is_some_and(|keep| !keep(item)) {
            return;
        }
        self.items.push((self.projection)(item));
        self.sequences.push(sequence);
    }

    pub(crate) fn set_next_sequence_to_read(&mut self, sequence: i64) {
        self.next_sequence_to_read = sequence;
    }

    /// Returns `true` once `max_size` items are kept.
    #[must_use]
    #[inline]
    pub fn is_max_size_reached(&self) -> bool {
        self.items.len() >= self.max_size
    }

    /// Returns `true` once at least `min_size` items are kept.
    #[must_use]
    #[inline]
    pub fn is_min_size_reached(&self) -> bool {
        self.items.len() >= self.min_size
    }

    /// Number of records visited, including filtered ones.
    #[must_use]
    #[inline]
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// Sequence a follow-up read should start from.
    #[must_use]
    #[inline]
    pub fn next_sequence_to_read(&self) -> i64 {
        self.next_sequence_to_read
    }

    /// Number of kept items.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when nothing was kept.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Kept items in sequence order.
    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Sequence of each kept item, parallel to [`items`](Self::items).
    #[must_use]
    pub fn sequences(&self) -> &[i64] {
        &self.sequences
    }

    /// Iterates `(sequence, item)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &R)> + '_ {
        self.sequences.iter().copied().zip(self.items.iter())
    }

    /// Consumes the set, returning the kept items.
    #[must_use]
    pub fn into_items(self) -> Vec<R> {
        self.items
    }
}

impl<E, R> fmt::Debug for ReadResultSet<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadResultSet")
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("has_predicate", &self.predicate.is_some())
            .field("len", &self.items.len())
            .field("read_count", &self.read_count)
            .field("next_sequence_to_read", &self.next_sequence_to_read)
            .finish()
    }
}
