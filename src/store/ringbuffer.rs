//! Fixed-capacity array ring addressed by sequence number.

/// One occupied slot.
#[derive(Debug, Clone)]
struct Slot<E> {
    item: E,
    /// Wall-clock expiry in milliseconds, `None` when entries never expire.
    expires_at: Option<u64>,
}

/// Array-backed ring buffer.
///
/// Sequence `s` lives at index `s % capacity`. A fresh ring has
/// `head = 0, tail = -1`. Appending to a full ring overwrites the slot of
/// the head, which is advanced first, so `head <= tail + 1` always holds
/// and sequences are never reused.
#[derive(Debug)]
pub(crate) struct ArrayRingbuffer<E> {
    slots: Vec<Option<Slot<E>>>,
    head: i64,
    tail: i64,
}

impl<E> ArrayRingbuffer<E> {
    /// A ring with `capacity` slots. `capacity` must be positive.
    pub(crate) fn new(capacity: u32) -> Self {
        let mut slots = Vec::with_capacity(capacity as usize);
        slots.resize_with(capacity as usize, || None);
        Self {
            slots,
            head: 0,
            tail: -1,
        }
    }

    #[inline]
    pub(crate) fn head_sequence(&self) -> i64 {
        self.head
    }

    #[inline]
    pub(crate) fn tail_sequence(&self) -> i64 {
        self.tail
    }

    #[inline]
    pub(crate) fn capacity(&self) -> i64 {
        self.slots.len() as i64
    }

    #[inline]
    pub(crate) fn size(&self) -> i64 {
        self.tail - self.head + 1
    }

    #[inline]
    fn index(&self, sequence: i64) -> usize {
        (sequence.rem_euclid(self.capacity())) as usize
    }

    /// Appends `item`, evicting the oldest record if the ring is full.
    /// Returns the sequence assigned to the item.
    pub(crate) fn add(&mut self, item: E, expires_at: Option<u64>) -> i64 {
        self.tail += 1;
        if self.tail - self.capacity() == self.head {
            self.head += 1;
        }
        let index = self.index(self.tail);
        self.slots[index] = Some(Slot { item, expires_at });
        self.tail
    }

    /// The item at `sequence`, or `None` if it is outside `[head, tail]`.
    pub(crate) fn read(&self, sequence: i64) -> Option<&E> {
        if sequence < self.head || sequence > self.tail {
            return None;
        }
        self.slots[self.index(sequence)]
            .as_ref()
            .map(|slot| &slot.item)
    }

    /// Advances the head past every expired record. Returns how many were
    /// dropped.
    pub(crate) fn evict_expired(&mut self, now_millis: u64) -> u64 {
        let mut evicted = 0;
        while self.head <= self.tail {
            let index = self.index(self.head);
            let expired = match &self.slots[index] {
                Some(slot) => slot.expires_at.is_some_and(|at| at <= now_millis),
                None => true,
            };
            if !expired {
                break;
            }
            self.slots[index] = None;
            self.head += 1;
            evicted += 1;
        }
        evicted
    }
}
