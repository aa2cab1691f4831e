//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors for a single log line. These are warnings: readers log and skip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed line: {0}")]
    MalformedLine(String),
}

/// Errors that abort the analysis of one flow/trace pair
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No usable timestamps in flow log {}", path.display())]
    EmptyLog { path: PathBuf },
}

/// Errors raised by the command runner
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to spawn '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },
}

/// Errors loading or rendering the testbed configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config")]
    Io(#[from] std::io::Error),

    #[error("Invalid config TOML")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown experiment profile: {0}")]
    UnknownProfile(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_io_cause_not_repeated_in_message() {
        let err = AnalysisError::Io {
            path: PathBuf::from("/tmp/trace"),
            source: io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        assert_eq!(err.to_string(), "Failed to read /tmp/trace");
        assert!(err.source().is_some());

        let chained = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chained.matches("valid UTF-8").count(), 1);
    }

    #[test]
    fn test_config_parse_cause_is_source() {
        let err = ConfigError::from(toml::from_str::<toml::Value>("= 1").unwrap_err());
        assert_eq!(err.to_string(), "Invalid config TOML");
        assert!(err.source().is_some());
    }
}
