//! Log parsing and report schema definitions.
//!
//! This module handles:
//! - Parsing flow logs into an observation window and byte counts
//! - Parsing function-call trace logs into entry/exit events
//! - Defining the JSON report schema

pub mod flow;
mod lines;
pub mod schema;
pub mod trace;

// Re-export main types
pub use flow::{parse_flow_line, parse_flow_log, read_flow_log, FlowLog, FlowRecord, ObservationWindow};
pub use schema::{AnalysisReport, FunctionTime, SessionReport, SessionStats};
pub use trace::{
    filter_events, parse_trace_events, parse_trace_line, read_trace_events, Direction, TraceEvent,
};
