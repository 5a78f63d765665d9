//! Types for the engine transport.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use uuid::Uuid;

use super::error::EngineError;

/// Binary payload channels of a run.
///
/// The stdin source is copied into the engine when the command reads
/// `pipe:0`. The engine's `pipe:1` output is copied into the stdout sink.
/// Neither channel is ever parsed.
#[derive(Default)]
pub struct RunIo {
    pub stdin: Option<Box<dyn AsyncRead + Send + Unpin>>,
    pub stdout: Option<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl RunIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdin(mut self, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.stdin = Some(Box::new(reader));
        self
    }

    pub fn with_stdout(mut self, writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.stdout = Some(Box::new(writer));
        self
    }
}

impl std::fmt::Debug for RunIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunIo")
            .field("stdin", &self.stdin.is_some())
            .field("stdout", &self.stdout.is_some())
            .finish()
    }
}

/// Summary of a run that exited successfully.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Identifier attached to every log line of the run.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub exit_code: i32,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
    pub progress_events: u64,
    pub parse_errors: u64,
    pub last_line: Option<String>,
    /// False when metadata had to be flushed at end of output.
    pub metadata_complete: bool,
}

impl RunOutcome {
    /// Turns an incomplete metadata phase into an error.
    pub fn require_complete_metadata(self) -> Result<Self, EngineError> {
        if self.metadata_complete {
            Ok(self)
        } else {
            Err(EngineError::IncompleteMetadata)
        }
    }
}
