//! Flow log parser.
//!
//! A flow log is the per-packet dump written alongside a capture, one record
//! per line: `3.366:10:1204:o:0`. Only the timestamp (field 0) and the size
//! (field 2) matter here. The first and last timestamps bound the window
//! used to filter the trace log.

use super::lines::for_each_line;
use crate::utils::config::{
    BITS_PER_BYTE, BITS_PER_MEGABIT, FIELD_DELIMITER, FLOW_SIZE_FIELD, FLOW_TIMESTAMP_FIELD,
};
use crate::utils::error::{AnalysisError, ParseError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One parsed flow log line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRecord {
    pub timestamp: f64,
    pub size_bytes: Option<u64>,
}

/// Inclusive `[start, stop]` time range taken from a flow log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start: f64,
    pub stop: f64,
}

impl ObservationWindow {
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    /// Inclusive on both ends
    pub fn contains(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.stop
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// All usable records of one flow log, in file order
#[derive(Debug, Clone)]
pub struct FlowLog {
    pub path: PathBuf,
    pub records: Vec<FlowRecord>,

    /// Lines dropped because they had no usable timestamp
    pub skipped_lines: usize,
}

impl FlowLog {
    /// First and last timestamps in file order
    ///
    /// # Errors
    /// * `AnalysisError::EmptyLog` - no line carried a usable timestamp
    pub fn window(&self) -> Result<ObservationWindow, AnalysisError> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Ok(ObservationWindow::new(first.timestamp, last.timestamp)),
            _ => Err(AnalysisError::EmptyLog {
                path: self.path.clone(),
            }),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.records.iter().filter_map(|r| r.size_bytes).sum()
    }

    /// Aggregate throughput over the window in megabits per second
    ///
    /// Returns `None` for an empty log or a window that does not advance.
    pub fn throughput_mbps(&self) -> Option<f64> {
        let window = self.window().ok()?;
        let duration = window.duration();
        if duration <= 0.0 {
            return None;
        }
        Some(BITS_PER_BYTE * self.total_bytes() as f64 / (duration * BITS_PER_MEGABIT))
    }
}

/// Parse a single flow log line
///
/// **Public** - building block for `read_flow_log` and `parse_flow_log`
///
/// # Errors
/// * `ParseError::MalformedLine` - blank line or non-numeric timestamp
pub fn parse_flow_line(line: &str) -> Result<FlowRecord, ParseError> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();

    let raw_ts = fields.get(FLOW_TIMESTAMP_FIELD).copied().unwrap_or("");
    if raw_ts.is_empty() {
        return Err(ParseError::MalformedLine("missing timestamp".to_string()));
    }
    let timestamp = raw_ts
        .parse::<f64>()
        .map_err(|e| ParseError::MalformedLine(format!("bad timestamp '{}': {}", raw_ts, e)))?;

    // A short line still counts towards the window, just not the byte total
    let size_bytes = fields.get(FLOW_SIZE_FIELD).and_then(|raw| match raw.parse::<u64>() {
        Ok(size) => Some(size),
        Err(e) => {
            debug!("Ignoring unparsable size '{}': {}", raw, e);
            None
        }
    });

    Ok(FlowRecord {
        timestamp,
        size_bytes,
    })
}

/// Parse flow log content already held in memory
pub fn parse_flow_log(path: impl Into<PathBuf>, content: &str) -> FlowLog {
    let mut log = FlowLog {
        path: path.into(),
        records: Vec::new(),
        skipped_lines: 0,
    };
    for (index, line) in content.lines().enumerate() {
        push_flow_line(&mut log, index, line);
    }
    log
}

/// Read and parse a flow log from disk
///
/// **Public** - main entry point for the window extractor
///
/// Lines that are blank, not UTF-8, or lack a numeric timestamp are
/// skipped and counted in `skipped_lines`.
///
/// # Errors
/// * `AnalysisError::Io` - the file cannot be opened or read
pub fn read_flow_log(path: impl AsRef<Path>) -> Result<FlowLog, AnalysisError> {
    let path = path.as_ref();
    debug!("Reading flow log: {}", path.display());

    let mut log = FlowLog {
        path: path.to_path_buf(),
        records: Vec::new(),
        skipped_lines: 0,
    };
    for_each_line(path, |line_no, line| {
        match line.and_then(parse_flow_line) {
            Ok(record) => log.records.push(record),
            Err(e) => {
                warn!("{}:{}: {}", path.display(), line_no, e);
                log.skipped_lines += 1;
            }
        }
    })?;

    debug!(
        "Flow log {}: {} records, {} skipped",
        path.display(),
        log.records.len(),
        log.skipped_lines
    );
    Ok(log)
}

fn push_flow_line(log: &mut FlowLog, index: usize, line: &str) {
    match parse_flow_line(line) {
        Ok(record) => log.records.push(record),
        Err(e) => {
            warn!("{}:{}: {}", log.path.display(), index + 1, e);
            log.skipped_lines += 1;
        }
    }
}
