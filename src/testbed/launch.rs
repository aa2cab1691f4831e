//! Start packet captures and prebuilt applications for an experiment.
//!
//! Captures are wrapped in `timeout` so they stop on their own. Applications
//! are detached (optionally in their own xterm) unless marked foreground.

use super::config::{AppSpec, CaptureSpec, ExperimentProfile};
use super::runner::CommandRunner;
use super::topology::in_namespace;
use crate::utils::error::CommandError;
use chrono::{DateTime, Utc};
use log::info;
use std::thread;
use std::time::Duration;

/// Summary of what a launch issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchSummary {
    pub captures: usize,
    pub apps: usize,
}

/// Seconds since the Unix epoch, with microsecond precision
pub fn reference_time(now: DateTime<Utc>) -> f64 {
    now.timestamp_micros() as f64 / 1e6
}

fn in_optional_namespace(namespace: Option<&str>, command: &str) -> String {
    match namespace {
        Some(ns) => in_namespace(ns, command),
        None => command.to_string(),
    }
}

fn in_terminal(use_xterm: bool, command: &str) -> String {
    if use_xterm {
        format!("xterm -hold -e '{}'", command)
    } else {
        command.to_string()
    }
}

/// Command line for one packet capture
pub fn capture_command(capture: &CaptureSpec, duration_secs: u64, use_xterm: bool) -> String {
    let mut tcpdump = format!("tcpdump -i {} -w {}", capture.interface, capture.output);
    if capture.packet_buffered {
        tcpdump.push_str(" -U");
    }
    let timed = format!(
        "timeout -k {d} {d} {}",
        in_terminal(use_xterm, &tcpdump),
        d = duration_secs
    );
    in_optional_namespace(capture.namespace.as_deref(), &timed)
}

/// How long an app is asked to run: one second short of the capture
pub fn app_run_secs(duration_secs: u64) -> u64 {
    duration_secs.saturating_sub(1)
}

/// Command line for one application, placeholders substituted
pub fn app_command(app: &AppSpec, profile: &ExperimentProfile, ref_time: f64) -> String {
    let command = app
        .command
        .replace("{ref_time}", &format!("{:.6}", ref_time))
        .replace("{run_secs}", &app_run_secs(profile.duration_secs).to_string());

    // Foreground apps share this terminal
    let wrapped = if app.foreground {
        command
    } else {
        in_terminal(profile.use_xterm, &command)
    };
    in_optional_namespace(app.namespace.as_deref(), &wrapped)
}

/// Run an experiment profile: prebuild, captures, then applications
///
/// **Public** - main entry point for the launch command
///
/// # Errors
/// * `CommandError::Spawn` - a command could not be started
pub fn launch_experiment(
    runner: &mut dyn CommandRunner,
    profile: &ExperimentProfile,
    ref_time: f64,
) -> Result<LaunchSummary, CommandError> {
    let mut summary = LaunchSummary::default();

    if let Some(prebuild) = &profile.prebuild {
        info!("Running prebuild: {}", prebuild);
        runner.execute(prebuild)?;
    }

    for capture in &profile.captures {
        info!("Running tcpdump on {} ...", capture.interface);
        runner.spawn_detached(&capture_command(capture, profile.duration_secs, profile.use_xterm))?;
        summary.captures += 1;
    }

    let stagger = Duration::from_millis(profile.stagger_ms);
    for app in &profile.apps {
        let command = app_command(app, profile, ref_time);
        if app.foreground {
            info!("Running executable in the foreground ...");
            runner.execute(&command)?;
        } else {
            info!("Running executable in the background ...");
            runner.spawn_detached(&command)?;
        }
        summary.apps += 1;

        if !stagger.is_zero() {
            thread::sleep(stagger);
        }
    }

    info!(
        "Launched {} captures and {} applications",
        summary.captures, summary.apps
    );
    Ok(summary)
}
