//! Fixed-capacity circular storage for [`Record`] values.
//!
//! This mirrors the index arithmetic of a lock-free SPMC ring (slot index
//! from a monotonic counter, modulo the capacity) but drops the power-of-2
//! masking trick: the monitor holds this buffer behind a single mutex, so
//! there is no need for a bitmask to avoid a division on the hot path, and
//! the spec allows any positive capacity rather than only powers of two.

use std::mem::MaybeUninit;

use crate::error::MonitorError;
use crate::record::Record;

/// A fixed-capacity ring of `Record` slots, tracking the oldest valid entry
/// (`start`) and how many entries are currently valid (`count`).
///
/// Invariant: slots `[start, start + count)` (mod `capacity`) hold
/// initialized records with strictly increasing `seq`; all other slots are
/// logically empty (their `MaybeUninit` may or may not hold stale bytes from
/// a prior overwrite, but they are never read).
pub(crate) struct RingBuffer {
    slots: Box<[MaybeUninit<Record>]>,
    capacity: usize,
    start: usize,
    count: usize,
}

impl RingBuffer {
    pub(crate) fn new(capacity: usize) -> Result<Self, MonitorError> {
        if capacity == 0 {
            return Err(MonitorError::InvalidArgument("capacity must be > 0"));
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, MaybeUninit::uninit);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            capacity,
            start: 0,
            count: 0,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// Inserts `record`, overwriting the oldest entry once the ring is full.
    ///
    /// Matches the settled reference monitor's append algorithm: grow into
    /// free slots first, then overwrite-and-advance `start` once full.
    pub(crate) fn insert(&mut self, record: Record) {
        let insert_idx = if self.count < self.capacity {
            let idx = (self.start + self.count) % self.capacity;
            self.count += 1;
            idx
        } else {
            let idx = self.start;
            self.start = (self.start + 1) % self.capacity;
            idx
        };
        self.slots[insert_idx] = MaybeUninit::new(record);
    }

    /// Copies the newest `min(count, max)` records, oldest first.
    pub(crate) fn snapshot(&self, max: usize) -> Vec<Record> {
        let n = self.count.min(max);
        if n == 0 {
            return Vec::new();
        }
        let begin = (self.start + (self.count - n)) % self.capacity;
        (0..n)
            .map(|i| {
                let idx = (begin + i) % self.capacity;
                // SAFETY: idx falls within [start, start + count), which is
                // always fully initialized per the struct invariant.
                unsafe { self.slots[idx].assume_init() }
            })
            .collect()
    }
}
