//! Per-step diagnostic records and the sinks that receive them.

use crate::curve::CurveInfo;
use crate::history::HistoricData;
use crate::math::Point2d;
use crate::reward::SubRewards;
use serde::Serialize;
use std::io::Write;

/// The diagnostic record of one step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepRecord {
    /// The number of steps evaluated this session, including this one.
    pub step: u64,
    /// The simulator's step counter.
    pub steps: u64,
    pub reward: f64,
    /// Absent when a failure flag cut the step short.
    pub sub_rewards: Option<SubRewards>,
    pub target_speed: Option<f64>,
    pub curvature_multiplier: Option<f64>,
    pub curve: Option<CurveInfo>,
    pub target_point: Option<Point2d>,
    pub heading_error: Option<f64>,
    pub history: HistoricData,
    /// Geometric debug primitives drawn during the step.
    #[cfg(feature = "debug")]
    pub debug: serde_json::Value,
}

/// Receives step records. Emitting never fails from the caller's point of view.
pub trait EventSink {
    fn emit(&mut self, record: &StepRecord);
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _record: &StepRecord) {}
}

/// Logs every record as JSON at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, record: &StepRecord) {
        match serde_json::to_string(record) {
            Ok(json) => log::debug!("{}", json),
            Err(err) => log::warn!("Failed to serialise step record: {}", err),
        }
    }
}

/// Keeps every record in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Vec<StepRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Default::default()
    }

    /// The records received so far.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Removes and returns the records received so far.
    pub fn take(&mut self) -> Vec<StepRecord> {
        std::mem::take(&mut self.records)
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, record: &StepRecord) {
        self.records.push(record.clone());
    }
}

/// Writes every record as a line of JSON.
///
/// Write failures are logged and the record is dropped.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &StepRecord) {
        let result = serde_json::to_writer(&mut self.writer, record)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(err) = result {
            log::warn!("Failed to write step record {}: {}", record.step, err);
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, record: &StepRecord) {
        (**self).emit(record)
    }
}
