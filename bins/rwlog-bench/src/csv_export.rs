//! Optional `--dump-csv` export of the final snapshot.
//!
//! Not implemented anywhere in the original source despite a CSV path being
//! referenced; the column order here (`seq,origin,timestamp_ns,message`) is
//! the stable target the distilled spec asks for.

use std::path::Path;
use std::time::UNIX_EPOCH;

use rwlog_core::Monitor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("failed to open {path} for writing")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write CSV rows")]
    Write(#[from] csv::Error),
    #[error("failed to flush CSV writer")]
    Flush(#[from] std::io::Error),
    #[error("monitor is not initialized")]
    MonitorNotInitialized(#[from] rwlog_core::MonitorError),
}

/// Writes every record currently in `monitor`'s ring (oldest first) to
/// `path` as CSV, returning the number of rows written.
pub fn dump(monitor: &Monitor, path: impl AsRef<Path>) -> Result<usize, CsvExportError> {
    let capacity = monitor.capacity()?;
    let records = {
        let section = monitor.begin_read()?;
        section.snapshot(capacity)
    };

    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|source| CsvExportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    writer.write_record(["seq", "origin", "timestamp_ns", "message"])?;
    for record in &records {
        let timestamp_ns = record
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        writer.write_record(&[
            record.seq.to_string(),
            format!("{:?}", record.origin),
            timestamp_ns.to_string(),
            record.message_str().unwrap_or("<non-utf8>").to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(records.len())
}
