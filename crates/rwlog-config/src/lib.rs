//! Typed configuration for the `rwlog-bench` harness.
//!
//! The harness's external interface is a set of CLI flags, not a config
//! file, so this crate plays the role `onyx-config`/`obsidian-config` play
//! for their binaries — a struct, a validation step, a small `thiserror`
//! error enum — but with `clap`'s derive API standing in for `toml`/`serde`
//! as the parsing front end.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Validated harness configuration.
///
/// Built by parsing [`RawArgs`] with `clap` and then calling
/// [`RawArgs::validate`]; callers never construct this directly with
/// unchecked fields.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub capacity: usize,
    pub readers: usize,
    pub writers: usize,
    pub writer_batch: usize,
    pub run_for: Duration,
    pub reader_delay: Duration,
    pub writer_delay: Duration,
    pub dump_csv: bool,
}

/// Command-line surface, parsed with `clap`'s derive API.
///
/// Field defaults mirror the harness's documented defaults; [`RawArgs::validate`]
/// rejects the values that would make the monitor or the run loop meaningless
/// (e.g. zero capacity) rather than letting them reach `Monitor::create`.
#[derive(Parser, Debug)]
#[command(name = "rwlog-bench")]
#[command(about = "Stress harness for the bounded reader-writer event log")]
#[command(long_about = None)]
pub struct RawArgs {
    /// Ring capacity (must be > 0).
    #[arg(long, default_value_t = 1024)]
    pub capacity: usize,

    /// Number of reader threads.
    #[arg(long, default_value_t = 2)]
    pub readers: usize,

    /// Number of writer threads.
    #[arg(long, default_value_t = 2)]
    pub writers: usize,

    /// Appends per writer critical section (must be >= 1).
    #[arg(long, default_value_t = 2)]
    pub writer_batch: usize,

    /// Run duration in seconds (must be > 0).
    #[arg(long, default_value_t = 10)]
    pub seconds: u64,

    /// Reader post-section delay, in microseconds.
    #[arg(long, default_value_t = 2000)]
    pub rd_us: u64,

    /// Writer post-section delay, in microseconds.
    #[arg(long, default_value_t = 3000)]
    pub wr_us: u64,

    /// Dump the final snapshot to log.csv.
    #[arg(long, default_value_t = false)]
    pub dump_csv: bool,
}

/// Errors in harness configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--capacity must be > 0")]
    ZeroCapacity,
    #[error("--writer-batch must be >= 1")]
    ZeroWriterBatch,
    #[error("--seconds must be > 0")]
    ZeroDuration,
}

impl RawArgs {
    /// Validates the parsed flags, producing a [`HarnessConfig`].
    pub fn validate(self) -> Result<HarnessConfig, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.writer_batch == 0 {
            return Err(ConfigError::ZeroWriterBatch);
        }
        if self.seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(HarnessConfig {
            capacity: self.capacity,
            readers: self.readers,
            writers: self.writers,
            writer_batch: self.writer_batch,
            run_for: Duration::from_secs(self.seconds),
            reader_delay: Duration::from_micros(self.rd_us),
            writer_delay: Duration::from_micros(self.wr_us),
            dump_csv: self.dump_csv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RawArgs {
        RawArgs::parse_from(["rwlog-bench"])
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = defaults().validate().unwrap();
        assert_eq!(cfg.capacity, 1024);
        assert_eq!(cfg.readers, 2);
        assert_eq!(cfg.writers, 2);
        assert_eq!(cfg.writer_batch, 2);
        assert_eq!(cfg.run_for, Duration::from_secs(10));
        assert_eq!(cfg.reader_delay, Duration::from_micros(2000));
        assert_eq!(cfg.writer_delay, Duration::from_micros(3000));
        assert!(!cfg.dump_csv);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut args = defaults();
        args.capacity = 0;
        assert_eq!(args.validate().unwrap_err(), ConfigError::ZeroCapacity);
    }

    #[test]
    fn zero_writer_batch_is_rejected() {
        let mut args = defaults();
        args.writer_batch = 0;
        assert_eq!(args.validate().unwrap_err(), ConfigError::ZeroWriterBatch);
    }

    #[test]
    fn zero_seconds_is_rejected() {
        let mut args = defaults();
        args.seconds = 0;
        assert_eq!(args.validate().unwrap_err(), ConfigError::ZeroDuration);
    }

    #[test]
    fn dump_csv_flag_parses() {
        let args = RawArgs::parse_from(["rwlog-bench", "--dump-csv", "--capacity", "8"]);
        let cfg = args.validate().unwrap();
        assert!(cfg.dump_csv);
        assert_eq!(cfg.capacity, 8);
    }
}
