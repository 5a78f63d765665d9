//! Process transport for the ffmpeg binary.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join3;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::config::EngineConfig;
use super::drive::{drive_diagnostics, finish_interrupted};
use super::error::EngineError;
use super::traits::Engine;
use super::types::{RunIo, RunOutcome};
use crate::command::EngineCommand;
use crate::metrics;
use crate::parser::{DiagnosticParser, ParserEvent};

/// Engine backed by a local ffmpeg binary.
pub struct FfmpegEngine {
    config: EngineConfig,
}

impl FfmpegEngine {
    /// Creates a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full argument list: configured globals, then the compiled command.
    pub fn build_args(&self, command: &EngineCommand) -> Result<Vec<String>, EngineError> {
        let mut args = self.config.global_args();
        args.extend(command.args()?);
        Ok(args)
    }

    fn spawn_error(&self, e: std::io::Error) -> EngineError {
        if e.kind() == ErrorKind::NotFound {
            EngineError::NotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            EngineError::Io(e)
        }
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        command: &EngineCommand,
        io: RunIo,
        events: mpsc::Sender<ParserEvent>,
    ) -> Result<RunOutcome, EngineError> {
        let started_at = Utc::now();
        let start = Instant::now();

        if command.reads_stdin() != io.stdin.is_some() {
            return Err(EngineError::invalid_command(
                "stdin payload must be supplied exactly when an input reads pipe:0",
            ));
        }
        if command.writes_stdout() != io.stdout.is_some() {
            return Err(EngineError::invalid_command(
                "stdout sink must be supplied exactly when an output writes pipe:1",
            ));
        }
        let args = self.build_args(command)?;
        info!(engine = %self.config.ffmpeg_path.display(), ?args, "Starting engine");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(if io.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(if io.stdout.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                metrics::RUNS_TOTAL.with_label_values(&["spawn_error"]).inc();
                self.spawn_error(e)
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Io(std::io::Error::other("stderr not captured")))?;
        let child_stdin = child.stdin.take();
        let child_stdout = child.stdout.take();
        let RunIo { stdin, stdout } = io;

        let pump_stdin = async move {
            if let (Some(mut source), Some(sink)) = (stdin, child_stdin) {
                let mut sink = BufWriter::new(sink);
                match tokio::io::copy(&mut source, &mut sink).await {
                    Ok(_) => sink.flush().await.or_else(ignore_broken_pipe)?,
                    // The engine may stop reading before the payload ends
                    Err(e) => ignore_broken_pipe(e)?,
                }
                // Dropping the pipe closes the engine's stdin
            }
            Ok::<(), std::io::Error>(())
        };

        let pump_stdout = async move {
            if let (Some(mut source), Some(mut sink)) = (child_stdout, stdout) {
                tokio::io::copy(&mut source, &mut sink).await?;
                sink.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let mut parser = DiagnosticParser::new();
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            try_join3(
                pump_stdin,
                pump_stdout,
                drive_diagnostics(stderr, &mut parser, &events),
            )
            .await?;
            child.wait().await
        })
        .await;

        let elapsed = start.elapsed();
        metrics::RUN_DURATION.observe(elapsed.as_secs_f64());

        let status = match result {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                let _ = child.kill().await;
                finish_interrupted(&mut parser, &events).await;
                metrics::RUNS_TOTAL.with_label_values(&["failed"]).inc();
                return Err(EngineError::Io(e));
            }
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                finish_interrupted(&mut parser, &events).await;
                metrics::RUNS_TOTAL.with_label_values(&["timeout"]).inc();
                warn!(timeout_secs = self.config.timeout_secs, "Engine run timed out");
                return Err(EngineError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        let last_line = parser.last_line().map(str::to_string);
        if !status.success() {
            metrics::RUNS_TOTAL.with_label_values(&["failed"]).inc();
            error!(code = ?status.code(), last_line = ?last_line, "Engine failed");
            return Err(EngineError::process_failed(status.code(), last_line));
        }

        if !parser.metadata_complete() {
            warn!("Engine finished before reporting complete metadata");
        }
        metrics::RUNS_TOTAL.with_label_values(&["success"]).inc();
        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            progress_events = parser.progress_events(),
            "Engine finished"
        );

        Ok(RunOutcome {
            run_id,
            started_at,
            exit_code: status.code().unwrap_or(0),
            elapsed_ms: elapsed.as_millis() as u64,
            progress_events: parser.progress_events(),
            parse_errors: parser.parse_errors(),
            last_line,
            metadata_complete: parser.metadata_complete(),
        })
    }
}

fn ignore_broken_pipe(e: std::io::Error) -> std::io::Result<()> {
    if e.kind() == ErrorKind::BrokenPipe {
        Ok(())
    } else {
        Err(e)
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn validate(&self) -> Result<(), EngineError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::process_failed(
                output.status.code(),
                stderr.lines().last().map(str::to_string),
            ));
        }
        Ok(())
    }

    async fn run(
        &self,
        command: &EngineCommand,
        io: RunIo,
        events: mpsc::Sender<ParserEvent>,
    ) -> Result<RunOutcome, EngineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("engine_run", %run_id);
        self.run_inner(run_id, command, io, events)
            .instrument(span)
            .await
    }
}
