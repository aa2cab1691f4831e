//! Setup and launch command implementations.
//!
//! Both load the testbed config (or the built-in default), pick a runner
//! (`ShellRunner`, or `DryRunRunner` for `--dry-run`) and hand it the
//! requested plan.

use super::models::{LaunchArgs, SetupArgs};
use crate::testbed::{
    launch_experiment, reference_time, run_steps, CommandRunner, DryRunRunner, LaunchSummary,
    ShellRunner, TestbedConfig,
};
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;

fn make_runner(dry_run: bool, strict: bool) -> Box<dyn CommandRunner> {
    if dry_run {
        Box::new(DryRunRunner::echoing())
    } else if strict {
        Box::new(ShellRunner::strict())
    } else {
        Box::new(ShellRunner::new())
    }
}

/// Execute the setup command
///
/// **Public** - main entry point called from main.rs
///
/// Returns the number of commands issued.
pub fn execute_setup(args: SetupArgs) -> Result<usize> {
    let config = TestbedConfig::load_or_default(args.config.as_deref())
        .context("Failed to load testbed config")?;

    let steps: Vec<String> = args.steps.iter().map(ToString::to_string).collect();
    info!("Setup steps: {}", steps.join(", "));

    let mut runner = make_runner(args.dry_run, args.strict);
    let count = run_steps(runner.as_mut(), &config, &args.steps)
        .context("Testbed setup failed")?;

    info!("✓ Issued {} commands", count);
    Ok(count)
}

/// Execute the launch command
///
/// **Public** - main entry point called from main.rs
pub fn execute_launch(args: LaunchArgs) -> Result<LaunchSummary> {
    let config = TestbedConfig::load_or_default(args.config.as_deref())
        .context("Failed to load testbed config")?;
    let profile = config.experiment(&args.profile)?;

    let ref_time = reference_time(Utc::now());
    info!("Launching profile '{}' (ref time {:.6})", args.profile, ref_time);

    let mut runner = make_runner(args.dry_run, false);
    let summary = launch_experiment(runner.as_mut(), profile, ref_time)
        .with_context(|| format!("Failed to launch profile '{}'", args.profile))?;

    Ok(summary)
}

/// Validate setup arguments
pub fn validate_setup_args(args: &SetupArgs) -> Result<()> {
    if args.steps.is_empty() {
        anyhow::bail!("No setup steps selected");
    }
    if let Some(path) = &args.config {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }
    Ok(())
}
