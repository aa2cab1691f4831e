//! Emulation testbed orchestration.
//!
//! This module handles:
//! - Describing the topology and experiments (TOML config)
//! - Building and running namespace/link/shaping/route command plans
//! - Launching packet captures and applications
//!
//! All side effects go through a `CommandRunner`.

pub mod config;
pub mod launch;
pub mod runner;
pub mod topology;

// Re-export main types
pub use config::{ExperimentProfile, TestbedConfig};
pub use launch::{launch_experiment, reference_time, LaunchSummary};
pub use runner::{CommandRunner, DryRunRunner, RecordedCommand, ShellRunner};
pub use topology::{
    route_plan, run_steps, setup_routes, setup_topology, teardown, teardown_plan, topology_plan,
    CommandGroup, SetupStep,
};
