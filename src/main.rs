//! Netemu Studio CLI
//!
//! Sets up the emulated network, launches experiments under it, and
//! breaks captured traces down into time spent per function.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use netemu_studio::commands::{
    display_version, execute_analyze, execute_launch, execute_setup, print_default_config,
    validate_analyze_args, validate_setup_args, AnalyzeArgs, LaunchArgs, SetupArgs,
};
use netemu_studio::testbed::SetupStep;
use netemu_studio::utils::config::DEFAULT_REPORT_THRESHOLD;

/// Netemu Studio - network emulation testbed tooling
#[derive(Parser, Debug)]
#[command(name = "netemu")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Report throughput and time spent per function for flow/trace pairs
    Analyze {
        /// Flow log (repeat for several sessions)
        #[arg(short, long, required = true)]
        flow: Vec<PathBuf>,

        /// Function-call trace log, one per --flow
        #[arg(short, long, required = true)]
        trace: Vec<PathBuf>,

        /// Session label, one per --flow (defaults to session-N)
        #[arg(long)]
        tag: Vec<String>,

        /// Stop listing after the first function below this many seconds
        #[arg(long, default_value_t = DEFAULT_REPORT_THRESHOLD)]
        threshold: f64,

        /// Also write all session reports to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Create, route or tear down the emulated network
    Setup {
        /// Steps to run: 1|topo, 2|route, 3|clean (default: topo route)
        steps: Vec<SetupStep>,

        /// Testbed config TOML (defaults to the built-in topology)
        #[arg(short, long, env = "NETEMU_CONFIG")]
        config: Option<PathBuf>,

        /// Print commands instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Abort on the first command that exits non-zero
        #[arg(long)]
        strict: bool,
    },

    /// Start packet captures and applications for an experiment profile
    Launch {
        /// Experiment profile name from the config
        #[arg(short, long, default_value = "emu")]
        profile: String,

        /// Testbed config TOML (defaults to the built-in topology)
        #[arg(short, long, env = "NETEMU_CONFIG")]
        config: Option<PathBuf>,

        /// Print commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the built-in testbed configuration as TOML
    PrintConfig,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            flow,
            trace,
            tag,
            threshold,
            json,
        } => {
            let args = AnalyzeArgs {
                sessions: AnalyzeArgs::pair_sessions(flow, trace, tag)?,
                threshold,
                output_json: json,
            };

            validate_analyze_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Setup {
            steps,
            config,
            dry_run,
            strict,
        } => {
            let args = SetupArgs {
                steps: if steps.is_empty() {
                    SetupStep::DEFAULT.to_vec()
                } else {
                    steps
                },
                config,
                dry_run,
                strict,
            };

            validate_setup_args(&args)?;
            execute_setup(args)?;
        }

        Commands::Launch {
            profile,
            config,
            dry_run,
        } => {
            execute_launch(LaunchArgs {
                profile,
                config,
                dry_run,
            })?;
        }

        Commands::PrintConfig => {
            print_default_config()?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
