//! Rank functions by cumulative time for reporting.
//!
//! The ranking applies a display cutoff: once a function below the threshold
//! has been listed, nothing after it is shown. The underlying table is not
//! modified.

use super::func_time::FunctionTimeTable;
use crate::parser::schema::FunctionTime;
use log::debug;

/// Rank functions by cumulative time, descending
///
/// **Public** - main entry point for report ranking
///
/// # Arguments
/// * `table` - Aggregated function times
/// * `window_secs` - Observation window length, used for percentages
/// * `threshold` - Listing stops after the first entry below this value
///
/// # Returns
/// Ranked entries; ties are ordered by function name
pub fn rank_function_times(
    table: &FunctionTimeTable,
    window_secs: f64,
    threshold: f64,
) -> Vec<FunctionTime> {
    let mut sorted: Vec<(&str, f64)> = table.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut ranked = Vec::with_capacity(sorted.len());
    for (function, secs) in sorted {
        ranked.push(create_function_time(function, secs, window_secs));
        // The first sub-threshold entry is still listed
        if secs < threshold {
            break;
        }
    }

    debug!(
        "Ranked {} of {} functions (threshold {})",
        ranked.len(),
        table.len(),
        threshold
    );
    ranked
}

/// Create a FunctionTime entry with its share of the window
///
/// **Public** - also used by tests and the JSON writer
pub fn create_function_time(function: &str, total_secs: f64, window_secs: f64) -> FunctionTime {
    let percentage = if window_secs > 0.0 {
        (total_secs / window_secs) * 100.0
    } else {
        0.0
    };

    FunctionTime {
        function: function.to_string(),
        total_secs,
        percentage,
    }
}
