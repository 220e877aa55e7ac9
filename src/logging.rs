// src/logging.rs
//
// Per-transmitter result sinks.
// - EventSink: trait the harness writes run records to
// - NoopSink:  discards all records
// - FileSink:  writes one JSON object per line (JSONL)

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::SimConfig;
use crate::simulator::{SimulationResult, Transmitter};

/// Summary of one transmitter after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransmitterRecord {
    pub transmitter: usize,
    pub preference_model: &'static str,
    pub lambda: f64,
    pub noise_mode: &'static str,
    pub epochs: usize,
    pub success_rate: f64,
    pub mean_time_to_tx_h: f64,
    pub visited_states: usize,
}

impl TransmitterRecord {
    pub fn from_run(
        index: usize,
        cfg: &SimConfig,
        result: &SimulationResult,
        transmitter: &Transmitter,
    ) -> Self {
        let times = result.time_to_tx_h.get(index).map(Vec::as_slice).unwrap_or(&[]);
        let mean_time_to_tx_h = if times.is_empty() {
            0.0
        } else {
            times.iter().sum::<f64>() / times.len() as f64
        };
        Self {
            transmitter: index,
            preference_model: transmitter.model().name(),
            lambda: cfg.lambda,
            noise_mode: cfg.noise_mode.name(),
            epochs: result.num_epochs(),
            success_rate: result.transmitter_success_rate(index),
            mean_time_to_tx_h,
            visited_states: transmitter.visits().visited_states(),
        }
    }
}

/// Abstract sink for per-transmitter records.
pub trait EventSink {
    fn log_transmitter(&mut self, record: &TransmitterRecord);

    fn flush(&mut self) {}
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_transmitter(&mut self, _record: &TransmitterRecord) {}
}

/// JSONL file sink.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create (truncate) `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl EventSink for FileSink {
    fn log_transmitter(&mut self, record: &TransmitterRecord) {
        // A broken log file must not abort a run.
        if let Err(err) = serde_json::to_writer(&mut self.writer, record) {
            tracing::warn!(%err, "failed to write transmitter record");
            return;
        }
        let _ = self.writer.write_all(b"\n");
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Write one record per transmitter, in index order.
pub fn log_result<S: EventSink + ?Sized>(
    sink: &mut S,
    cfg: &SimConfig,
    result: &SimulationResult,
    transmitters: &[Transmitter],
) {
    for (i, tx) in transmitters.iter().enumerate() {
        sink.log_transmitter(&TransmitterRecord::from_run(i, cfg, result, tx));
    }
    sink.flush();
}
