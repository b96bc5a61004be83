//! The controller read/write seam.
//!
//! The production link speaks the controller's HTTP/JSON protocol and lives
//! outside this repository. [`LoopbackController`] stands in for it in tests
//! and offline runs.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::LinkError;
use crate::signal::{ControlReadings, ControlSignal, SignalValue, WriteRequest};

pub trait ControllerLink {
    /// Read the named signals. Signals the controller does not report are
    /// simply absent from the result.
    fn read_controls(&mut self, signals: &[ControlSignal]) -> Result<ControlReadings, LinkError>;

    /// Push plant values to the controller. The result is advisory.
    fn write_controls(&mut self, requests: &[WriteRequest]) -> Result<(), LinkError>;
}

/// In-memory controller: serves a fixed command table and keeps the latest
/// write per signal.
///
/// Written values become readable, so a loopback run sees the plant's own
/// temperatures and flows when it reads them back.
#[derive(Debug, Clone, Default)]
pub struct LoopbackController {
    table: ControlReadings,
    latest: BTreeMap<ControlSignal, WriteRequest>,
    write_count: u64,
    fail_reads: bool,
}

impl LoopbackController {
    pub fn new(table: ControlReadings) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Set a value served to subsequent reads.
    pub fn set(&mut self, signal: ControlSignal, value: impl Into<SignalValue>) {
        self.table.insert(signal, value);
    }

    /// Make every read fail with a timeout, as an unreachable controller would.
    pub fn set_offline(&mut self, offline: bool) {
        self.fail_reads = offline;
    }

    /// Number of write requests received so far.
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// The most recent write of every signal written so far.
    pub fn latest_writes(&self) -> impl Iterator<Item = &WriteRequest> + '_ {
        self.latest.values()
    }

    pub fn last_written(&self, signal: ControlSignal) -> Option<WriteRequest> {
        self.latest.get(&signal).copied()
    }
}

impl ControllerLink for LoopbackController {
    fn read_controls(&mut self, signals: &[ControlSignal]) -> Result<ControlReadings, LinkError> {
        if self.fail_reads {
            return Err(LinkError::Timeout { operation: "read" });
        }
        let readings: ControlReadings = signals
            .iter()
            .filter_map(|&sig| self.table.get(sig).map(|v| (sig, v)))
            .collect();
        debug!(requested = signals.len(), served = readings.len(), "loopback read");
        Ok(readings)
    }

    fn write_controls(&mut self, requests: &[WriteRequest]) -> Result<(), LinkError> {
        for req in requests {
            self.table.insert(req.signal, req.value);
            self.latest.insert(req.signal, *req);
        }
        self.write_count += requests.len() as u64;
        Ok(())
    }
}
