use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ffstream_core::{
    load_config_or_default, metrics, validate_config, Engine, EngineCommand, FfmpegEngine,
    ParserEvent, RunIo, Source, Target,
};

const USAGE: &str = "usage: ffstream <input|-> <output|-> [output options...]";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("FFSTREAM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("ffstream.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let registry = Registry::new();
    if config.metrics.enabled {
        for metric in metrics::all_metrics() {
            registry
                .register(metric)
                .context("Failed to register metrics")?;
        }
    }

    let command = parse_args(std::env::args().skip(1))?;
    let mut io = RunIo::new();
    if command.reads_stdin() {
        io = io.with_stdin(tokio::io::stdin());
    }
    if command.writes_stdout() {
        io = io.with_stdout(tokio::io::stdout());
    }

    let engine = FfmpegEngine::new(config.engine.clone());
    engine
        .validate()
        .await
        .with_context(|| format!("Engine unavailable at {:?}", config.engine.ffmpeg_path))?;

    let (tx, rx) = mpsc::channel(config.engine.event_buffer);
    let reporter = spawn_reporter(rx);

    let result = engine.run(&command, io, tx).await;
    let _ = reporter.await;

    if config.metrics.enabled {
        dump_metrics(&registry)?;
    }

    let outcome = result.context("Engine run failed")?;
    info!(
        run_id = %outcome.run_id,
        elapsed_ms = outcome.elapsed_ms,
        progress_events = outcome.progress_events,
        "Run finished"
    );
    Ok(())
}

/// Logs go to stderr so stdout stays free for `pipe:1` payloads.
fn init_logging() {
    let json = std::env::var("FFSTREAM_LOG_JSON").is_ok_and(|v| v == "1");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

/// Builds the engine command from `<input> <output> [output options...]`.
///
/// `-` stands for stdin as input and stdout as output.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<EngineCommand> {
    let mut args = args.into_iter();
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };

    let source = match input.as_str() {
        "-" => Source::Stdin,
        url if url.contains("://") => Source::Url(url.to_string()),
        path => Source::Path(PathBuf::from(path)),
    };
    let target = match output.as_str() {
        "-" => Target::Stdout,
        path => Target::Path(PathBuf::from(path)),
    };

    let mut command = EngineCommand::new().input(source).output(target);
    for arg in args {
        command = command.output_option(arg);
    }
    Ok(command)
}

fn spawn_reporter(mut rx: mpsc::Receiver<ParserEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ParserEvent::Metadata(record) => match serde_json::to_string_pretty(&record) {
                    Ok(json) => eprintln!("{json}"),
                    Err(e) => warn!("Failed to serialize metadata: {}", e),
                },
                ParserEvent::Progress(progress) => {
                    info!(
                        time_ms = progress.time_ms,
                        fraction = progress.fraction_complete,
                        speed = progress.speed,
                        "Progress"
                    );
                }
                ParserEvent::ParseError { .. } => {}
            }
        }
    })
}

fn dump_metrics(registry: &Registry) -> Result<()> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    eprint!("{}", String::from_utf8_lossy(&buffer));
    Ok(())
}
