//! Mock engine for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::command::EngineCommand;
use crate::engine::{drive_diagnostics, Engine, EngineError, RunIo, RunOutcome};
use crate::parser::{DiagnosticParser, ParserEvent};

/// Mock implementation of the Engine trait.
///
/// Replays a canned diagnostic log through a real [`DiagnosticParser`]
/// instead of spawning a process:
/// - Track compiled commands for assertions
/// - Simulate exit codes
/// - Control the diagnostic script
///
/// # Example
///
/// ```rust,ignore
/// use ffstream_core::testing::{fixtures, MockEngine};
///
/// let engine = MockEngine::new();
/// engine.set_script(fixtures::TRANSCODE_LOG).await;
///
/// let outcome = engine.run(&command, RunIo::new(), tx).await?;
///
/// let commands = engine.recorded_commands().await;
/// assert_eq!(commands.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Argument lists of every run.
    commands: Arc<RwLock<Vec<Vec<String>>>>,
    /// Diagnostic output replayed on each run.
    script: Arc<RwLock<String>>,
    /// Exit code reported by each run.
    exit_code: Arc<RwLock<i32>>,
    /// If set, validation fails with a not-found error.
    missing: Arc<RwLock<bool>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine that replays an empty log and exits with 0.
    pub fn new() -> Self {
        Self {
            commands: Arc::new(RwLock::new(Vec::new())),
            script: Arc::new(RwLock::new(String::new())),
            exit_code: Arc::new(RwLock::new(0)),
            missing: Arc::new(RwLock::new(false)),
        }
    }

    /// Set the diagnostic log replayed by subsequent runs.
    pub async fn set_script(&self, script: impl Into<String>) {
        *self.script.write().await = script.into();
    }

    /// Set the exit code reported by subsequent runs.
    pub async fn set_exit_code(&self, code: i32) {
        *self.exit_code.write().await = code;
    }

    /// Make validation fail as if the binary were missing.
    pub async fn set_missing(&self, missing: bool) {
        *self.missing.write().await = missing;
    }

    /// Get all argument lists run so far.
    pub async fn recorded_commands(&self) -> Vec<Vec<String>> {
        self.commands.read().await.clone()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), EngineError> {
        if *self.missing.read().await {
            return Err(EngineError::NotFound {
                path: "mock-ffmpeg".into(),
            });
        }
        Ok(())
    }

    async fn run(
        &self,
        command: &EngineCommand,
        _io: RunIo,
        events: mpsc::Sender<ParserEvent>,
    ) -> Result<RunOutcome, EngineError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let args = command.args()?;
        self.commands.write().await.push(args);

        let script = self.script.read().await.clone();
        let mut parser = DiagnosticParser::new();
        drive_diagnostics(script.as_bytes(), &mut parser, &events).await?;

        let exit_code = *self.exit_code.read().await;
        let last_line = parser.last_line().map(str::to_string);
        if exit_code != 0 {
            return Err(EngineError::process_failed(Some(exit_code), last_line));
        }

        Ok(RunOutcome {
            run_id: Uuid::new_v4(),
            started_at,
            exit_code,
            elapsed_ms: start.elapsed().as_millis() as u64,
            progress_events: parser.progress_events(),
            parse_errors: parser.parse_errors(),
            last_line,
            metadata_complete: parser.metadata_complete(),
        })
    }
}
