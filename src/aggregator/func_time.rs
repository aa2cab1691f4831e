//! Match function entry/exit events into cumulative time-in-function.
//!
//! Each function name owns a FIFO queue of pending entry timestamps. An exit
//! consumes the oldest pending entry for the same function, so every entry
//! is matched at most once.
//!
//! Durations are only non-negative when a function's exits do not precede
//! its entries in time. Trace logs are written in timestamp order, so this
//! is assumed rather than checked.

use crate::parser::{Direction, TraceEvent};
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Counters describing how the event stream was matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub matched_pairs: usize,

    /// Exits with no pending entry for their function
    pub unmatched_exits: usize,

    /// Entries still pending when the stream ended
    pub dangling_entries: usize,

    /// Matched pairs whose duration was not finite (infinite timestamps)
    pub non_finite_pairs: usize,
}

/// Cumulative seconds per function name
///
/// A function only appears once at least one of its entry/exit pairs has
/// been matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionTimeTable {
    totals: HashMap<String, f64>,
    pub stats: AggregationStats,
}

impl FunctionTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: &str) -> Option<f64> {
        self.totals.get(function).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(name, secs)| (name.as_str(), *secs))
    }

    /// Sum over all functions. Nested calls are counted in each frame.
    pub fn total_secs(&self) -> f64 {
        self.totals.values().sum()
    }

    fn add(&mut self, function: &str, secs: f64) {
        *self.totals.entry(function.to_string()).or_insert(0.0) += secs;
    }
}

/// Aggregate time-in-function from a window-filtered event stream
///
/// **Public** - main entry point for the entry/exit aggregator
///
/// # Algorithm
/// 1. Entry: push its timestamp onto the function's queue
/// 2. Exit: pop the oldest pending entry for the function, if any
/// 3. Add `exit - entry` to the function's total
/// 4. Leftover entries are discarded
pub fn aggregate_function_times(events: &[TraceEvent]) -> FunctionTimeTable {
    debug!("Aggregating function times from {} events", events.len());

    let mut pending: HashMap<&str, VecDeque<f64>> = HashMap::new();
    let mut table = FunctionTimeTable::new();

    for event in events {
        let function = event.function.as_str();
        match event.direction {
            Direction::Entry => {
                pending.entry(function).or_default().push_back(event.timestamp);
            }
            Direction::Exit => {
                match pending.get_mut(function).and_then(VecDeque::pop_front) {
                    Some(entered_at) => {
                        table.stats.matched_pairs += 1;
                        let secs = event.timestamp - entered_at;
                        if secs.is_finite() {
                            table.add(function, secs);
                        } else {
                            debug!("Dropping non-finite duration for {}", function);
                            table.stats.non_finite_pairs += 1;
                        }
                    }
                    None => table.stats.unmatched_exits += 1,
                }
            }
        }
    }

    table.stats.dangling_entries = pending.values().map(VecDeque::len).sum();

    debug!(
        "Matched {} pairs across {} functions ({} unmatched exits, {} dangling entries)",
        table.stats.matched_pairs,
        table.len(),
        table.stats.unmatched_exits,
        table.stats.dangling_entries
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_pair() {
        let events = vec![TraceEvent::entry(0.5, "foo"), TraceEvent::exit(0.8, "foo")];
        let table = aggregate_function_times(&events);
        assert_eq!(table.len(), 1);
        assert!(approx(table.get("foo").unwrap(), 0.3));
        assert_eq!(table.stats.matched_pairs, 1);
    }

    #[test]
    fn test_fifo_matching() {
        let events = vec![
            TraceEvent::entry(1.0, "f"),
            TraceEvent::entry(2.0, "f"),
            TraceEvent::exit(3.0, "f"),
            TraceEvent::exit(4.0, "f"),
        ];
        let table = aggregate_function_times(&events);
        // (3 - 1) + (4 - 2)
        assert!(approx(table.get("f").unwrap(), 4.0));
        assert_eq!(table.stats.matched_pairs, 2);
    }

    #[test]
    fn test_entry_consumed_once() {
        let events = vec![
            TraceEvent::entry(1.0, "f"),
            TraceEvent::exit(2.0, "f"),
            TraceEvent::exit(5.0, "f"),
        ];
        let table = aggregate_function_times(&events);
        assert!(approx(table.get("f").unwrap(), 1.0));
        assert_eq!(table.stats.unmatched_exits, 1);
    }

    #[test]
    fn test_unmatched_exit_ignored() {
        let events = vec![TraceEvent::exit(1.0, "bar")];
        let table = aggregate_function_times(&events);
        assert!(table.is_empty());
        assert_eq!(table.get("bar"), None);
        assert_eq!(table.stats.unmatched_exits, 1);
    }

    #[test]
    fn test_dangling_entry_discarded() {
        let events = vec![
            TraceEvent::entry(1.0, "foo"),
            TraceEvent::entry(1.5, "bar"),
            TraceEvent::exit(2.0, "bar"),
        ];
        let table = aggregate_function_times(&events);
        assert_eq!(table.get("foo"), None);
        assert!(approx(table.get("bar").unwrap(), 0.5));
        assert_eq!(table.stats.dangling_entries, 1);
    }

    #[test]
    fn test_non_finite_duration_dropped() {
        let events = vec![
            TraceEvent::entry(f64::INFINITY, "f00"),
            TraceEvent::exit(f64::INFINITY, "f00"),
            TraceEvent::entry(1.0, "f01"),
            TraceEvent::exit(1.5, "f01"),
        ];
        let table = aggregate_function_times(&events);
        assert_eq!(table.get("f00"), None);
        assert!(approx(table.get("f01").unwrap(), 0.5));
        assert_eq!(table.stats.matched_pairs, 2);
        assert_eq!(table.stats.non_finite_pairs, 1);
    }

    #[test]
    fn test_interleaved_functions() {
        let events = vec![
            TraceEvent::entry(0.0, "outer"),
            TraceEvent::entry(0.1, "inner"),
            TraceEvent::exit(0.4, "inner"),
            TraceEvent::exit(1.0, "outer"),
        ];
        let table = aggregate_function_times(&events);
        assert!(approx(table.get("outer").unwrap(), 1.0));
        assert!(approx(table.get("inner").unwrap(), 0.3));
        assert!(approx(table.total_secs(), 1.3));
    }

    #[test]
    fn test_idempotent() {
        let events = vec![
            TraceEvent::entry(0.0, "a"),
            TraceEvent::exit(0.2, "a"),
            TraceEvent::entry(0.3, "b"),
            TraceEvent::exit(0.9, "b"),
        ];
        assert_eq!(
            aggregate_function_times(&events),
            aggregate_function_times(&events)
        );
    }
}
