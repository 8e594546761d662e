//! The reader-writer monitor: a bounded ring buffer plus the writer-preference
//! admission protocol that guards it.
//!
//! # Synchronization protocol
//!
//! One mutex (`Inner`, behind `Core::inner`) protects the ring buffer and all
//! bookkeeping counters. Two condvars queue blocked threads:
//!
//! - `readers_cv`: readers wait here while a writer is active or any writer
//!   is waiting. Signaled by a departing writer when no writer is waiting.
//! - `writers_cv`: writers wait here while a writer is active or any reader
//!   is active. Signaled by the last departing reader (if a writer is
//!   waiting) or by a departing writer handing off to the next one.
//!
//! Every wait sits in a `while` loop re-checking its predicate, so spurious
//! wakeups and [`Monitor::wake_all`] are both safe: a woken thread that finds
//! its predicate still true simply waits again.

use std::sync::{Arc, Condvar, Mutex};
use std::time::SystemTime;

use tracing::debug;

use crate::error::MonitorError;
use crate::record::Record;
use crate::ring::RingBuffer;

struct Inner {
    ring: RingBuffer,
    seq_counter: u64,
    total_written: u64,
    active_readers: usize,
    active_writers: usize,
    waiting_writers: usize,
}

struct Core {
    inner: Mutex<Inner>,
    readers_cv: Condvar,
    writers_cv: Condvar,
}

/// A reader-writer event log with writer-preference admission.
///
/// `Monitor` is created empty via [`Monitor::new`], brought to the Ready
/// state with [`Monitor::create`], used for any number of read/write
/// sections, and finally torn down with [`Monitor::destroy`]. This mirrors
/// the lifecycle of the original C monitor (a single create/destroy pair
/// bracketing any number of sections) without resorting to global mutable
/// state: each `Monitor` value owns its own lifecycle, so tests can create
/// as many independent monitors as they like.
///
/// Intended usage is behind an `Arc<Monitor>` shared with worker threads;
/// every method takes `&self`.
pub struct Monitor {
    core: Mutex<Option<Arc<Core>>>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    /// Builds an uninitialized monitor. Call [`Monitor::create`] before use.
    pub fn new() -> Self {
        Self {
            core: Mutex::new(None),
        }
    }

    /// Brings the monitor to the Ready state with the given ring capacity.
    ///
    /// # Errors
    /// - [`MonitorError::InvalidArgument`] if `capacity == 0`.
    /// - [`MonitorError::AlreadyExists`] if this monitor is already Ready.
    pub fn create(&self, capacity: usize) -> Result<(), MonitorError> {
        let ring = RingBuffer::new(capacity)?;
        let mut slot = self.core.lock().unwrap();
        if slot.is_some() {
            return Err(MonitorError::AlreadyExists);
        }
        *slot = Some(Arc::new(Core {
            inner: Mutex::new(Inner {
                ring,
                seq_counter: 1,
                total_written: 0,
                active_readers: 0,
                active_writers: 0,
                waiting_writers: 0,
            }),
            readers_cv: Condvar::new(),
            writers_cv: Condvar::new(),
        }));
        debug!(capacity, "monitor created");
        Ok(())
    }

    /// Tears the monitor down. Callers must ensure no worker holds a
    /// [`ReadSection`] or [`WriteSection`] at the time of the call.
    ///
    /// # Errors
    /// [`MonitorError::NotInitialized`] if the monitor was never created, or
    /// was already destroyed.
    pub fn destroy(&self) -> Result<(), MonitorError> {
        let mut slot = self.core.lock().unwrap();
        if slot.take().is_none() {
            return Err(MonitorError::NotInitialized);
        }
        debug!("monitor destroyed");
        Ok(())
    }

    fn core(&self) -> Result<Arc<Core>, MonitorError> {
        self.core
            .lock()
            .unwrap()
            .clone()
            .ok_or(MonitorError::NotInitialized)
    }

    /// Blocks until admitted as a reader, then returns a guard scoping the
    /// read section. The reader is deregistered when the guard drops.
    pub fn begin_read(&self) -> Result<ReadSection, MonitorError> {
        let core = self.core()?;
        {
            let mut inner = core.inner.lock().unwrap();
            while inner.active_writers > 0 || inner.waiting_writers > 0 {
                inner = core.readers_cv.wait(inner).unwrap();
            }
            inner.active_readers += 1;
        }
        Ok(ReadSection { core })
    }

    /// Blocks until admitted as the sole writer, then returns a guard
    /// scoping the write section. The writer is deregistered when the guard
    /// drops.
    pub fn begin_write(&self) -> Result<WriteSection, MonitorError> {
        let core = self.core()?;
        {
            let mut inner = core.inner.lock().unwrap();
            inner.waiting_writers += 1;
            while inner.active_writers > 0 || inner.active_readers > 0 {
                inner = core.writers_cv.wait(inner).unwrap();
            }
            inner.waiting_writers -= 1;
            inner.active_writers = 1;
        }
        Ok(WriteSection { core })
    }

    /// Unblocks every thread currently waiting in [`Monitor::begin_read`] or
    /// [`Monitor::begin_write`], so each re-checks its admission predicate.
    /// Used during shutdown alongside an external stop flag; safe to call at
    /// any time.
    pub fn wake_all(&self) -> Result<(), MonitorError> {
        let core = self.core()?;
        // Acquire the lock before notifying: this keeps wake_all from racing
        // a thread that is between "check stop flag" and "begin waiting".
        let _inner = core.inner.lock().unwrap();
        core.readers_cv.notify_all();
        core.writers_cv.notify_all();
        Ok(())
    }

    /// Cumulative count of successful appends since this monitor's last
    /// `create`. May exceed the ring capacity.
    pub fn total_written(&self) -> Result<u64, MonitorError> {
        let core = self.core()?;
        Ok(core.inner.lock().unwrap().total_written)
    }

    /// The ring capacity this monitor was created with.
    pub fn capacity(&self) -> Result<usize, MonitorError> {
        let core = self.core()?;
        Ok(core.inner.lock().unwrap().ring.capacity())
    }
}

/// A scoped, shared read admission. Dropping it calls the equivalent of
/// `end_read`: it cannot be forgotten, even across an early return or a panic
/// unwind in the worker body.
pub struct ReadSection {
    core: Arc<Core>,
}

impl ReadSection {
    /// Copies the newest `min(count, max)` records, oldest first.
    ///
    /// `max == 0` returns an empty vector without touching the buffer.
    pub fn snapshot(&self, max: usize) -> Vec<Record> {
        if max == 0 {
            return Vec::new();
        }
        let inner = self.core.inner.lock().unwrap();
        inner.ring.snapshot(max)
    }
}

impl Drop for ReadSection {
    fn drop(&mut self) {
        let mut inner = self.core.inner.lock().unwrap();
        inner.active_readers -= 1;
        let should_wake_writer = inner.active_readers == 0 && inner.waiting_writers > 0;
        drop(inner);
        if should_wake_writer {
            self.core.writers_cv.notify_one();
        }
    }
}

/// A scoped, exclusive write admission. Dropping it calls the equivalent of
/// `end_write`: it cannot be forgotten, even across an early return or a
/// panic unwind in the worker body.
pub struct WriteSection {
    core: Arc<Core>,
}

impl WriteSection {
    /// Appends `message` as a new record, with the sequence number, origin
    /// thread, and timestamp assigned by the monitor. `message` is
    /// truncated and NUL-terminated at [`crate::record::MESSAGE_MAX`] bytes.
    pub fn append(&self, message: &[u8]) {
        let mut inner = self.core.inner.lock().unwrap();
        let seq = inner.seq_counter;
        inner.seq_counter += 1;
        let record = Record::new(seq, std::thread::current().id(), SystemTime::now(), message);
        inner.ring.insert(record);
        inner.total_written += 1;
    }
}

impl Drop for WriteSection {
    fn drop(&mut self) {
        let mut inner = self.core.inner.lock().unwrap();
        inner.active_writers = 0;
        let waiting_writers = inner.waiting_writers;
        drop(inner);
        if waiting_writers > 0 {
            self.core.writers_cv.notify_one();
        } else {
            self.core.readers_cv.notify_all();
        }
    }
}
