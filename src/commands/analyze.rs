//! Analyze command implementation.
//!
//! For every flow/trace pair the analyze command:
//! 1. Reads the flow log and derives the window and throughput
//! 2. Reads the trace log, keeping events inside the window
//! 3. Matches entry/exit events into time-in-function
//! 4. Ranks functions and prints the text report
//!
//! Optionally all session reports are written to one JSON file.

use super::models::{AnalyzeArgs, SessionInput};
use crate::aggregator::{aggregate_function_times, rank_function_times};
use crate::output::{render_session_report, write_report};
use crate::parser::schema::{AnalysisReport, SessionReport, SessionStats};
use crate::parser::{read_flow_log, read_trace_events};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable flow or trace log
/// * Flow log without usable timestamps
/// * JSON report write failure
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();

    let mut sessions = Vec::with_capacity(args.sessions.len());
    for input in &args.sessions {
        let report = analyze_session(input, args.threshold)
            .with_context(|| format!("Failed to analyze {} session", input.tag))?;
        print!("{}", render_session_report(&report));
        sessions.push(report);
    }

    let report = AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        sessions,
        generated_at: Utc::now().to_rfc3339(),
    };

    if let Some(path) = &args.output_json {
        write_report(&report, path).context("Failed to write JSON report")?;
        info!("✓ Report written to: {}", path.display());
    }

    info!(
        "Analyzed {} sessions in {:.2}s",
        report.sessions.len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Analyze one flow/trace pair
///
/// **Public** - usable without printing
pub fn analyze_session(input: &SessionInput, threshold: f64) -> Result<SessionReport> {
    info!(
        "Analyzing {}: flow={} trace={}",
        input.tag,
        input.flow_file.display(),
        input.trace_file.display()
    );

    let flow = read_flow_log(&input.flow_file)?;
    let window = flow.window()?;
    debug!("Window: {:.3}s .. {:.3}s", window.start, window.stop);

    let events = read_trace_events(&input.trace_file, &window)?;
    let table = aggregate_function_times(&events);
    let functions = rank_function_times(&table, window.duration(), threshold);

    Ok(SessionReport {
        tag: input.tag.clone(),
        flow_file: input.flow_file.display().to_string(),
        trace_file: input.trace_file.display().to_string(),
        window,
        throughput_mbps: flow.throughput_mbps(),
        total_bytes: flow.total_bytes(),
        functions,
        stats: SessionStats {
            events_in_window: events.len(),
            matched_pairs: table.stats.matched_pairs,
            unmatched_exits: table.stats.unmatched_exits,
            dangling_entries: table.stats.dangling_entries,
        },
    })
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_analyze_args(args: &AnalyzeArgs) -> Result<()> {
    if args.sessions.is_empty() {
        anyhow::bail!("At least one --flow/--trace pair is required");
    }

    if !args.threshold.is_finite() || args.threshold < 0.0 {
        anyhow::bail!("threshold must be a non-negative number");
    }

    for session in &args.sessions {
        if session.tag.trim().is_empty() {
            anyhow::bail!("Session tag cannot be empty");
        }
    }

    Ok(())
}
