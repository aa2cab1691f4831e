//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Field separator used by both flow and trace logs
pub const FIELD_DELIMITER: char = ':';

/// Direction marker for a function entry event; anything else is an exit
pub const ENTRY_MARKER: &str = "i";

// Field positions within a log line
pub const FLOW_TIMESTAMP_FIELD: usize = 0;
pub const FLOW_SIZE_FIELD: usize = 2;
pub const TRACE_TIMESTAMP_FIELD: usize = 0;
pub const TRACE_DIRECTION_FIELD: usize = 1;
pub const TRACE_FUNCTION_FIELD: usize = 3;
pub const TRACE_MIN_FIELDS: usize = 4;

/// Report stops after the first function whose total is below this (seconds)
pub const DEFAULT_REPORT_THRESHOLD: f64 = 0.01;

pub const BITS_PER_BYTE: f64 = 8.0;
pub const BITS_PER_MEGABIT: f64 = 1.0e6;

/// Shell used by the command runner
pub const SHELL: &str = "sh";

/// File the route step appends its routing table entry to
pub const RT_TABLES_PATH: &str = "/etc/iproute2/rt_tables";
