//! Function-call trace log parser.
//!
//! Instrumented executables write one event per function entry or exit:
//! `12.0041:i:3:send_segment`. Field 1 is the direction (`i` for entry,
//! anything else for exit) and field 3 the function name.

use super::flow::ObservationWindow;
use super::lines::for_each_line;
use crate::utils::config::{
    ENTRY_MARKER, FIELD_DELIMITER, TRACE_DIRECTION_FIELD, TRACE_FUNCTION_FIELD, TRACE_MIN_FIELDS,
    TRACE_TIMESTAMP_FIELD,
};
use crate::utils::error::{AnalysisError, ParseError};
use log::{debug, warn};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Entry,
    Exit,
}

impl Direction {
    /// Only the exact entry marker counts as an entry
    pub fn from_marker(marker: &str) -> Self {
        if marker == ENTRY_MARKER {
            Direction::Entry
        } else {
            Direction::Exit
        }
    }
}

/// A single function entry or exit
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub timestamp: f64,
    pub direction: Direction,
    pub function: String,
}

impl TraceEvent {
    pub fn entry(timestamp: f64, function: impl Into<String>) -> Self {
        Self {
            timestamp,
            direction: Direction::Entry,
            function: function.into(),
        }
    }

    pub fn exit(timestamp: f64, function: impl Into<String>) -> Self {
        Self {
            timestamp,
            direction: Direction::Exit,
            function: function.into(),
        }
    }
}

/// Parse a single trace log line
///
/// **Public** - building block for `read_trace_events`
///
/// # Errors
/// * `ParseError::MalformedLine` - fewer than four fields or a bad timestamp
pub fn parse_trace_line(line: &str) -> Result<TraceEvent, ParseError> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < TRACE_MIN_FIELDS {
        return Err(ParseError::MalformedLine(format!(
            "expected at least {} fields, found {}",
            TRACE_MIN_FIELDS,
            fields.len()
        )));
    }

    let raw_ts = fields[TRACE_TIMESTAMP_FIELD].trim();
    let timestamp = raw_ts
        .parse::<f64>()
        .map_err(|e| ParseError::MalformedLine(format!("bad timestamp '{}': {}", raw_ts, e)))?;

    Ok(TraceEvent {
        timestamp,
        direction: Direction::from_marker(fields[TRACE_DIRECTION_FIELD]),
        function: fields[TRACE_FUNCTION_FIELD].trim().to_string(),
    })
}

/// Keep only the events inside the window, preserving order
pub fn filter_events(events: Vec<TraceEvent>, window: &ObservationWindow) -> Vec<TraceEvent> {
    events
        .into_iter()
        .filter(|event| window.contains(event.timestamp))
        .collect()
}

/// Parse trace content already held in memory, keeping in-window events
pub fn parse_trace_events(content: &str, window: &ObservationWindow) -> Vec<TraceEvent> {
    content
        .lines()
        .filter_map(|line| parse_trace_line(line).ok())
        .filter(|event| window.contains(event.timestamp))
        .collect()
}

/// Read a trace log and keep the events inside the window
///
/// **Public** - main entry point for the trace filter
///
/// # Errors
/// * `AnalysisError::Io` - the file cannot be opened or read
pub fn read_trace_events(
    path: impl AsRef<Path>,
    window: &ObservationWindow,
) -> Result<Vec<TraceEvent>, AnalysisError> {
    let path = path.as_ref();
    debug!("Reading trace log: {}", path.display());

    let mut events = Vec::new();
    let mut skipped = 0usize;
    let mut outside = 0usize;
    for_each_line(path, |line_no, line| {
        match line.and_then(parse_trace_line) {
            Ok(event) if window.contains(event.timestamp) => events.push(event),
            Ok(_) => outside += 1,
            Err(e) => {
                warn!("{}:{}: {}", path.display(), line_no, e);
                skipped += 1;
            }
        }
    })?;

    debug!(
        "Trace log {}: {} events in window, {} outside, {} skipped",
        path.display(),
        events.len(),
        outside,
        skipped
    );
    Ok(events)
}
