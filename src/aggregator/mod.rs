//! Aggregation of trace events into per-function timing.
//!
//! This module transforms window-filtered trace events into:
//! - Cumulative time-in-function (FIFO entry/exit matching)
//! - A ranked listing for reports

pub mod func_time;
pub mod metrics;

// Re-export main types and functions
pub use func_time::{aggregate_function_times, AggregationStats, FunctionTimeTable};
pub use metrics::{create_function_time, rank_function_times};
