//! `rwlog-bench`: a synthetic concurrency workload that drives
//! [`rwlog_core::Monitor`] with writer and reader threads and reports
//! throughput and latency statistics.
//!
//! This is the harness the spec treats as an external collaborator: it owns
//! argument parsing, thread spawning, the run-duration timer, `SIGINT`
//! handling, metrics aggregation, and the optional CSV dump. None of the
//! safety or liveness guarantees live here; they live in the monitor.

mod csv_export;
mod stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use rwlog_config::RawArgs;
use rwlog_core::Monitor;

use stats::{ReaderStats, WriterStats};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("INFO")))
        .init();

    let config = match RawArgs::parse().validate() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let monitor = Arc::new(Monitor::new());
    if let Err(err) = monitor.create(config.capacity) {
        eprintln!("failed to create monitor: {err}");
        std::process::exit(1);
    }
    info!(
        capacity = config.capacity,
        readers = config.readers,
        writers = config.writers,
        "monitor created"
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        let monitor = monitor.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
            let _ = monitor.wake_all();
        }) {
            warn!(%err, "failed to install SIGINT handler; run will only stop after --seconds elapses");
        }
    }

    let mut writer_handles = Vec::with_capacity(config.writers);
    for id in 0..config.writers {
        let monitor = monitor.clone();
        let stop = stop.clone();
        let batch = config.writer_batch;
        let delay = config.writer_delay;
        writer_handles.push(thread::spawn(move || run_writer(id, monitor, stop, batch, delay)));
    }

    let mut reader_handles = Vec::with_capacity(config.readers);
    for id in 0..config.readers {
        let monitor = monitor.clone();
        let stop = stop.clone();
        let delay = config.reader_delay;
        reader_handles.push(thread::spawn(move || run_reader(id, monitor, stop, delay)));
    }

    let run_start = Instant::now();
    wait_for_duration_or_stop(config.run_for, &stop);
    stop.store(true, Ordering::Relaxed);
    let _ = monitor.wake_all();

    let writer_stats: Vec<WriterStats> = writer_handles
        .into_iter()
        .map(|h| h.join().expect("writer thread panicked"))
        .collect();
    let reader_stats: Vec<ReaderStats> = reader_handles
        .into_iter()
        .map(|h| h.join().expect("reader thread panicked"))
        .collect();
    let runtime = run_start.elapsed();

    if config.dump_csv {
        match csv_export::dump(&monitor, "log.csv") {
            Ok(rows) => info!(rows, path = "log.csv", "final snapshot dumped"),
            Err(err) => warn!(%err, "failed to write log.csv"),
        }
    }

    let total_written = monitor.total_written().unwrap_or(0);
    monitor.destroy().expect("monitor was already destroyed");
    info!(total_written, runtime_secs = runtime.as_secs_f64(), "monitor destroyed");

    report(&config, runtime, total_written, &writer_stats, &reader_stats);
}

/// Sleeps for `duration`, waking early and returning as soon as `stop` flips
/// true (e.g. from the `SIGINT` handler). Polls in short slices rather than
/// one long sleep so an interrupt is honored promptly.
fn wait_for_duration_or_stop(duration: Duration, stop: &AtomicBool) {
    const POLL: Duration = Duration::from_millis(100);
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        thread::sleep(POLL.min(deadline.saturating_duration_since(Instant::now())));
    }
}

/// Writer loop per the worker contract: begin_write, append up to `batch`
/// records, end_write (via guard drop), sleep, repeat until `stop`.
fn run_writer(id: usize, monitor: Arc<Monitor>, stop: Arc<AtomicBool>, batch: usize, delay: Duration) -> WriterStats {
    debug!(id, "writer started");
    let mut stats = WriterStats::default();
    let mut seq = 0u64;
    while !stop.load(Ordering::Relaxed) {
        let wait_start = Instant::now();
        let section = match monitor.begin_write() {
            Ok(section) => section,
            Err(err) => {
                warn!(id, %err, "writer begin_write failed, exiting");
                break;
            }
        };
        stats.record_wait(wait_start.elapsed());

        for _ in 0..batch {
            section.append(format!("writer-{id}-{seq}").as_bytes());
            seq += 1;
            stats.appended += 1;
        }
        drop(section);

        thread::sleep(delay);
    }
    debug!(id, appended = stats.appended, "writer stopped");
    stats
}

/// Reader loop per the worker contract: begin_read, snapshot into a bounded
/// local buffer, track the largest seq seen, end_read (via guard drop),
/// sleep, repeat until `stop`.
fn run_reader(id: usize, monitor: Arc<Monitor>, stop: Arc<AtomicBool>, delay: Duration) -> ReaderStats {
    const LOCAL_SNAPSHOT_CAP: usize = 256;
    debug!(id, "reader started");
    let mut stats = ReaderStats::default();
    while !stop.load(Ordering::Relaxed) {
        let section = match monitor.begin_read() {
            Ok(section) => section,
            Err(err) => {
                warn!(id, %err, "reader begin_read failed, exiting");
                break;
            }
        };
        let section_start = Instant::now();
        let snapshot = section.snapshot(LOCAL_SNAPSHOT_CAP);
        if let Some(top) = snapshot.last() {
            debug_assert!(top.seq >= stats.max_seq_seen, "snapshot monotonicity violated");
            stats.max_seq_seen = stats.max_seq_seen.max(top.seq);
        }
        drop(section);
        stats.record_section(section_start.elapsed());

        thread::sleep(delay);
    }
    debug!(id, iterations = stats.iterations, max_seq_seen = stats.max_seq_seen, "reader stopped");
    stats
}

fn report(
    config: &rwlog_config::HarnessConfig,
    runtime: Duration,
    total_written: u64,
    writer_stats: &[WriterStats],
    reader_stats: &[ReaderStats],
) {
    let runtime_secs = runtime.as_secs_f64().max(f64::MIN_POSITIVE);
    let throughput = total_written as f64 / runtime_secs;
    let avg_writer_wait_ms = stats::mean_writer_wait_ms(writer_stats);
    let avg_reader_section_ms = stats::mean_reader_section_ms(reader_stats);

    println!("rwlog-bench results");
    println!("  runtime:                 {:.3}s", runtime_secs);
    println!("  total entries written:   {total_written}");
    println!("  throughput:              {:.1} entries/s", throughput);
    println!("  avg writer wait:         {:.3} ms", avg_writer_wait_ms);
    println!("  avg reader section time: {:.3} ms", avg_reader_section_ms);
    println!("  readers:                 {}", config.readers);
    println!("  writers:                 {}", config.writers);
}
