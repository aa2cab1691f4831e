//! Output writers for analysis results.
//!
//! This module handles:
//! - Text session reports for stdout
//! - JSON reports on disk

pub mod json;
pub mod report;

// Re-export main functions
pub use json::write_report;
pub use report::{render_session_report, render_throughput};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create the parent directory of an output file if it is missing
pub fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create {}: {}", parent.display(), e))
            })
        }
        _ => Ok(()),
    }
}
