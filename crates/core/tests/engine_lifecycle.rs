//! Engine lifecycle integration tests.
//!
//! These tests drive the mock engine through whole runs and verify:
//! - Events reach the consumer in log order, with metadata first
//! - Failed runs carry the last diagnostic line
//! - Truncated logs produce incomplete metadata
//! - Backpressure from a slow consumer does not lose events

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ffstream_core::{
    command::{EngineCommand, Source, Target},
    engine::{Engine, EngineError, RunIo},
    parser::ParserEvent,
    testing::{fixtures, MockEngine},
};

/// Test helper that runs the mock engine with a collecting consumer.
struct TestHarness {
    engine: MockEngine,
}

impl TestHarness {
    async fn with_script(script: &str) -> Self {
        let engine = MockEngine::new();
        engine.set_script(script).await;
        Self { engine }
    }

    fn command() -> EngineCommand {
        EngineCommand::new()
            .overwrite()
            .input(Source::Path("input.mp4".into()))
            .output(Target::Path("output.webm".into()))
            .video_codec("libvpx-vp9")
            .audio_codec("libopus")
    }

    fn spawn_consumer(
        mut rx: mpsc::Receiver<ParserEvent>,
        delay: Option<Duration>,
    ) -> JoinHandle<Vec<ParserEvent>> {
        tokio::spawn(async move {
            let mut events = Vec::new();
            while let Some(event) = rx.recv().await {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                events.push(event);
            }
            events
        })
    }

    async fn run(
        &self,
        buffer: usize,
        delay: Option<Duration>,
    ) -> (
        Result<ffstream_core::RunOutcome, EngineError>,
        Vec<ParserEvent>,
    ) {
        let (tx, rx) = mpsc::channel(buffer);
        let consumer = Self::spawn_consumer(rx, delay);
        let result = self.engine.run(&Self::command(), RunIo::new(), tx).await;
        let events = consumer.await.expect("consumer panicked");
        (result, events)
    }
}

#[tokio::test]
async fn test_transcode_run_event_order() {
    let harness = TestHarness::with_script(fixtures::TRANSCODE_LOG).await;
    let (result, events) = harness.run(64, None).await;

    let outcome = result.expect("run should succeed");
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.progress_events, 3);
    assert_eq!(outcome.parse_errors, 0);
    assert!(outcome.metadata_complete);

    assert_eq!(events.len(), 4);
    match &events[0] {
        ParserEvent::Metadata(record) => {
            assert!(record.complete);
            assert_eq!(record.input.streams.len(), 2);
        }
        other => panic!("expected metadata first, got {other:?}"),
    }
    let fractions: Vec<Option<f64>> = events[1..]
        .iter()
        .map(|event| match event {
            ParserEvent::Progress(p) => p.fraction_complete,
            other => panic!("expected progress, got {other:?}"),
        })
        .collect();
    assert_eq!(fractions, vec![Some(0.25), Some(0.5), Some(1.0)]);
}

#[tokio::test]
async fn test_command_is_recorded() {
    let harness = TestHarness::with_script(fixtures::AUDIO_LOG).await;
    let (result, _) = harness.run(64, None).await;
    result.expect("run should succeed");

    let commands = harness.engine.recorded_commands().await;
    assert_eq!(commands.len(), 1);
    assert_eq!(
        commands[0],
        vec![
            "-y",
            "-i",
            "input.mp4",
            "-c:v",
            "libvpx-vp9",
            "-c:a",
            "libopus",
            "output.webm"
        ]
    );
}

#[tokio::test]
async fn test_failed_run_reports_last_line() {
    let harness = TestHarness::with_script(fixtures::MISSING_INPUT_LOG).await;
    harness.engine.set_exit_code(1).await;
    let (result, events) = harness.run(64, None).await;

    match result {
        Err(EngineError::ProcessFailed { code, last_line }) => {
            assert_eq!(code, Some(1));
            assert_eq!(
                last_line.as_deref(),
                Some("missing.mp4: No such file or directory")
            );
        }
        other => panic!("expected process failure, got {other:?}"),
    }

    // Nothing recognisable was printed, so only the flushed record arrives
    assert_eq!(events.len(), 1);
    match &events[0] {
        ParserEvent::Metadata(record) => {
            assert!(!record.complete);
            assert!(record.input.streams.is_empty());
        }
        other => panic!("expected metadata, got {other:?}"),
    }
}

#[tokio::test]
async fn test_truncated_run_has_incomplete_metadata() {
    let harness = TestHarness::with_script(fixtures::TRUNCATED_LOG).await;
    let (result, events) = harness.run(64, None).await;

    let outcome = result.expect("run should succeed");
    assert!(!outcome.metadata_complete);
    assert_eq!(outcome.progress_events, 0);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ParserEvent::Metadata(record) if !record.complete && record.input.duration_ms == Some(5_400_500)
    ));

    assert!(matches!(
        outcome.require_complete_metadata(),
        Err(EngineError::IncompleteMetadata)
    ));
}

#[tokio::test]
async fn test_slow_consumer_receives_every_event() {
    let harness = TestHarness::with_script(fixtures::TRANSCODE_LOG).await;
    let (result, events) = harness.run(1, Some(Duration::from_millis(5))).await;

    assert!(result.is_ok());
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], ParserEvent::Metadata(_)));
}

#[tokio::test]
async fn test_dropped_consumer_does_not_fail_run() {
    let harness = TestHarness::with_script(fixtures::TRANSCODE_LOG).await;
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let outcome = harness
        .engine
        .run(&TestHarness::command(), RunIo::new(), tx)
        .await
        .expect("run should succeed without a consumer");
    assert_eq!(outcome.progress_events, 3);
}

#[tokio::test]
async fn test_invalid_command_is_rejected() {
    let harness = TestHarness::with_script(fixtures::TRANSCODE_LOG).await;
    let (tx, _rx) = mpsc::channel(8);
    let command = EngineCommand::new().input(Source::Path("in.mp4".into()));

    let err = harness
        .engine
        .run(&command, RunIo::new(), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCommand { .. }));
    assert!(harness.engine.recorded_commands().await.is_empty());
}
