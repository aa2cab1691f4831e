//! Command runner used by every orchestration step.
//!
//! Orchestration never touches the OS directly; it hands shell command
//! lines to a `CommandRunner`. `ShellRunner` executes them through `sh -c`,
//! `DryRunRunner` only records them.

use crate::utils::config::SHELL;
use crate::utils::error::CommandError;
use log::{info, warn};
use std::process::{Command, Stdio};

/// Executes shell command lines on behalf of the testbed
pub trait CommandRunner {
    /// Run a command to completion and return its stdout
    fn execute(&mut self, command: &str) -> Result<String, CommandError>;

    /// Start a command without waiting for it
    fn spawn_detached(&mut self, command: &str) -> Result<(), CommandError>;
}

/// Runs commands through the system shell
///
/// A non-zero exit status is logged and otherwise ignored unless `strict`
/// is set. Failing to start the shell is always an error.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    pub strict: bool,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl CommandRunner for ShellRunner {
    fn execute(&mut self, command: &str) -> Result<String, CommandError> {
        info!("*** Command: {}", command);

        let output = Command::new(SHELL)
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !stdout.trim().is_empty() {
            info!("*** Output: {}", stdout.trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = output.status.code().unwrap_or(-1);
            if self.strict {
                return Err(CommandError::Failed {
                    command: command.to_string(),
                    status,
                    stderr,
                });
            }
            warn!("Command exited with {}: {}", status, stderr);
        }

        Ok(stdout)
    }

    fn spawn_detached(&mut self, command: &str) -> Result<(), CommandError> {
        info!("*** Command (detached): {}", command);

        Command::new(SHELL)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        Ok(())
    }
}

/// A command seen by `DryRunRunner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: String,
    pub detached: bool,
}

/// Records commands instead of running them
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner {
    pub recorded: Vec<RecordedCommand>,

    /// Print each command to stdout as it is recorded
    pub echo: bool,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            recorded: Vec::new(),
            echo: true,
        }
    }

    /// Recorded command lines, in order
    pub fn commands(&self) -> Vec<&str> {
        self.recorded.iter().map(|r| r.command.as_str()).collect()
    }

    fn record(&mut self, command: &str, detached: bool) {
        if self.echo {
            let suffix = if detached { " &" } else { "" };
            println!("{}{}", command, suffix);
        }
        self.recorded.push(RecordedCommand {
            command: command.to_string(),
            detached,
        });
    }
}

impl CommandRunner for DryRunRunner {
    fn execute(&mut self, command: &str) -> Result<String, CommandError> {
        self.record(command, false);
        Ok(String::new())
    }

    fn spawn_detached(&mut self, command: &str) -> Result<(), CommandError> {
        self.record(command, true);
        Ok(())
    }
}
