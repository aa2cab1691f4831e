//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use super::flow::ObservationWindow;
use serde::{Deserialize, Serialize};

/// Top-level report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// One entry per analyzed flow/trace pair
    pub sessions: Vec<SessionReport>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

/// Result of analyzing one flow log together with one trace log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Label used in the report header (e.g. "server")
    pub tag: String,

    pub flow_file: String,
    pub trace_file: String,

    pub window: ObservationWindow,

    /// `None` when the window has zero length
    pub throughput_mbps: Option<f64>,

    pub total_bytes: u64,

    /// Functions ranked by cumulative time, after the display cutoff
    pub functions: Vec<FunctionTime>,

    pub stats: SessionStats,
}

/// Cumulative time spent in a single function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTime {
    pub function: String,

    /// Seconds, summed over all matched entry/exit pairs
    pub total_secs: f64,

    /// Share of the observation window
    pub percentage: f64,
}

/// Bookkeeping counters collected while parsing and matching
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub events_in_window: usize,
    pub matched_pairs: usize,
    pub unmatched_exits: usize,
    pub dangling_entries: usize,
}
