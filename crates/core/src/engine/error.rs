//! Error types for the engine transport.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine binary not found.
    #[error("Engine not found at path: {path}")]
    NotFound { path: PathBuf },

    /// The command cannot be compiled or does not match the supplied pipes.
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    /// The engine exited with a non-zero status.
    #[error(
        "Engine exited with code {}: {}",
        describe_code(.code),
        .last_line.as_deref().unwrap_or("no diagnostic output")
    )]
    ProcessFailed {
        code: Option<i32>,
        /// Last non-empty diagnostic line, usually the engine's own error.
        last_line: Option<String>,
    },

    /// The run did not finish in time.
    #[error("Engine run timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The diagnostic stream ended before metadata was complete.
    #[error("Engine output ended before metadata was complete")]
    IncompleteMetadata,

    /// I/O error on a pipe or while spawning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl EngineError {
    /// Creates an invalid command error.
    pub fn invalid_command(reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            reason: reason.into(),
        }
    }

    /// Creates a process failure error.
    pub fn process_failed(code: Option<i32>, last_line: Option<String>) -> Self {
        Self::ProcessFailed { code, last_line }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_message_carries_last_line() {
        let err = EngineError::process_failed(
            Some(1),
            Some("in.mp4: No such file or directory".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Engine exited with code 1: in.mp4: No such file or directory"
        );
    }

    #[test]
    fn test_process_failed_without_context() {
        let err = EngineError::process_failed(None, None);
        assert_eq!(
            err.to_string(),
            "Engine exited with code none: no diagnostic output"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(EngineError::Timeout { timeout_secs: 5 }.is_retryable());
        assert!(!EngineError::invalid_command("x").is_retryable());
        assert!(!EngineError::IncompleteMetadata.is_retryable());
    }
}
