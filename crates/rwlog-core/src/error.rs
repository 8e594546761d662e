use thiserror::Error;

/// Errors reported by [`crate::Monitor`].
///
/// The monitor never logs on its own; every failure is returned to the
/// caller as one of these variants.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// A zero capacity, a zero `max` in `snapshot`, or similar malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// `create` called on a monitor that already holds a log.
    #[error("monitor already created")]
    AlreadyExists,

    /// An operation was attempted before `create` or after `destroy`.
    #[error("monitor not initialized")]
    NotInitialized,

    /// Buffer allocation failed in `create`.
    ///
    /// Unreachable on stable Rust (`Vec` allocation failure aborts the
    /// process rather than returning), kept so the error enum mirrors the
    /// abstract monitor contract in full.
    #[error("out of memory")]
    OutOfMemory,

    /// Mutex/condvar initialization failed.
    ///
    /// Unreachable: `std::sync::{Mutex, Condvar}` construction is
    /// infallible. Kept for the same reason as [`Self::OutOfMemory`].
    #[error("failed to initialize synchronization primitives")]
    PrimitiveInitFailed,
}
