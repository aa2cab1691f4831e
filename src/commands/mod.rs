//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod models;
pub mod setup;
pub mod utils;

// Re-export main command functions
pub use analyze::{analyze_session, execute_analyze, validate_analyze_args};
pub use models::{AnalyzeArgs, LaunchArgs, SessionInput, SetupArgs};
pub use setup::{execute_launch, execute_setup, validate_setup_args};
pub use utils::{display_version, print_default_config};
