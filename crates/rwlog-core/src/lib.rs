//! `rwlog-core`: a bounded, in-memory reader-writer event log.
//!
//! Multiple writers append short records to a fixed-capacity circular
//! buffer; multiple readers take atomic snapshots of the newest records. A
//! single [`Monitor`] mediates all access under a writer-preference
//! admission policy: a waiting writer blocks new readers from entering, so
//! a steady stream of readers cannot starve writers out, while multiple
//! readers may still run concurrently with each other.
//!
//! # Example
//!
//! ```
//! use rwlog_core::Monitor;
//!
//! let monitor = Monitor::new();
//! monitor.create(1024).unwrap();
//!
//! {
//!     let w = monitor.begin_write().unwrap();
//!     w.append(b"hello");
//! } // write section ends here, readers may be admitted
//!
//! {
//!     let r = monitor.begin_read().unwrap();
//!     let latest = r.snapshot(16);
//!     assert_eq!(latest[0].message(), b"hello");
//! }
//!
//! monitor.destroy().unwrap();
//! ```
//!
//! # Module map
//!
//! - [`record`]: the fixed-layout log entry.
//! - `ring` (private): the circular buffer storage behind the monitor's lock.
//! - [`monitor`]: the monitor itself, its admission protocol, and the
//!   [`ReadSection`]/[`WriteSection`] RAII guards.
//! - [`error`]: the [`MonitorError`] kinds the monitor can report.

pub mod error;
pub mod monitor;
pub mod record;
mod ring;

pub use error::MonitorError;
pub use monitor::{Monitor, ReadSection, WriteSection};
pub use record::{Record, MESSAGE_MAX};
