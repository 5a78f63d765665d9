//! Engine module for running ffmpeg and streaming its diagnostic output.
//!
//! This module provides the `Engine` trait and an implementation that spawns
//! the ffmpeg binary, wires its standard I/O, and feeds its diagnostic
//! channel through a [`DiagnosticParser`](crate::parser::DiagnosticParser).
//!
//! # Features
//!
//! - Stdin payloads and stdout sinks (`pipe:0` / `pipe:1`)
//! - Metadata and progress events on an mpsc channel, with backpressure
//! - Run timeouts
//! - Failure reporting with the engine's last diagnostic line
//!
//! # Example
//!
//! ```ignore
//! use ffstream_core::engine::{Engine, FfmpegEngine, RunIo};
//! use ffstream_core::command::{EngineCommand, Source, Target};
//! use ffstream_core::parser::ParserEvent;
//!
//! let engine = FfmpegEngine::with_defaults();
//! engine.validate().await?;
//!
//! let command = EngineCommand::new()
//!     .overwrite()
//!     .input(Source::Path("/path/to/input.mkv".into()))
//!     .output(Target::Path("/path/to/output.mp4".into()))
//!     .video_codec("libx264");
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         if let ParserEvent::Progress(p) = event {
//!             println!("{:?}", p.fraction_complete);
//!         }
//!     }
//! });
//!
//! let outcome = engine.run(&command, RunIo::new(), tx).await?;
//! println!("Finished in {} ms", outcome.elapsed_ms);
//! ```

mod config;
mod drive;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EngineConfig;
pub use drive::drive_diagnostics;
pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use traits::Engine;
pub use types::{RunIo, RunOutcome};
