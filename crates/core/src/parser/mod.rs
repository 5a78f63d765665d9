//! Streaming parser for the engine's diagnostic output.
//!
//! The engine writes a human readable log on its diagnostic channel: a
//! description of every input and output (container, duration, streams,
//! free-form metadata) followed by periodic status lines while it works.
//! [`DiagnosticParser`] consumes that log one line at a time, while the
//! process is still running, and reports:
//!
//! - one [`MetadataRecord`] when the metadata phase ends (a `Stream mapping:`
//!   line or the first status line), or a partial one from
//!   [`DiagnosticParser::finish`] if the log stops before that
//! - one [`ProgressRecord`] per status line
//! - a [`ParseError`] for recognised lines whose contents are malformed
//!
//! # Example
//!
//! ```
//! use ffstream_core::parser::{DiagnosticParser, ParserEvent};
//!
//! let mut parser = DiagnosticParser::new();
//! let mut events: Vec<ParserEvent> = Vec::new();
//! for line in [
//!     "Input #0, mp4, from 'x'",
//!     "Duration: 00:00:10.00, start: 0.000000, bitrate: 128 kb/s",
//!     "Stream #0:0: Video: h264, yuv420p, 1280x720, 30 fps",
//!     "Stream mapping:",
//! ] {
//!     parser.feed_line(line, &mut events);
//! }
//! assert!(matches!(&events[0], ParserEvent::Metadata(m) if m.input.duration_ms == Some(10_000)));
//! ```

mod accumulator;
mod classify;
mod error;
pub mod fields;
mod lines;
mod listener;
mod progress;
mod types;

pub use accumulator::{MetadataAccumulator, MetadataState};
pub use classify::{classify, LineKind};
pub use error::ParseError;
pub use lines::{LineSplitter, MAX_LINE_BYTES};
pub use listener::{ParserEvent, ParserListener};
pub use progress::decode as decode_progress;
pub use types::{
    AudioDetails, MediaSection, MetadataRecord, ProgressRecord, StreamDescriptor, StreamDetails,
    StreamKind, Tags, VideoDetails,
};

use tracing::{debug, warn};

use crate::metrics;

/// Line-at-a-time interpreter of one engine run's diagnostic log.
///
/// Each instance is independent; run several side by side for concurrent
/// transcodes.
#[derive(Debug, Default)]
pub struct DiagnosticParser {
    accumulator: MetadataAccumulator,
    last_line: String,
    progress_events: u64,
    parse_errors: u64,
}

impl DiagnosticParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interprets one line and reports what it produced to `listener`.
    ///
    /// Never fails: malformed lines go to
    /// [`ParserListener::on_parse_error`] and the feed continues.
    pub fn feed_line<L: ParserListener + ?Sized>(&mut self, line: &str, listener: &mut L) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.last_line.clear();
        self.last_line.push_str(line);

        let kind = classify(line);
        metrics::LINES_TOTAL.with_label_values(&[kind.as_str()]).inc();

        match self.accumulator.apply(kind, line) {
            Ok(Some(record)) => {
                debug!(
                    inputs = record.input.streams.len(),
                    outputs = record.output.streams.len(),
                    "Metadata complete"
                );
                listener.on_metadata(record);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%error, line, "Failed to parse diagnostic line");
                self.parse_errors += 1;
                metrics::PARSE_ERRORS.inc();
                listener.on_parse_error(line, error);
            }
        }

        if kind == LineKind::Progress {
            let record = progress::decode(line, self.accumulator.input_duration_ms());
            self.progress_events += 1;
            metrics::PROGRESS_EVENTS.inc();
            listener.on_progress(record);
        }
    }

    /// Signals the end of the diagnostic stream.
    ///
    /// If the metadata phase never ended, the partial record is reported
    /// with `complete == false`. Returns whether such a flush happened.
    pub fn finish<L: ParserListener + ?Sized>(&mut self, listener: &mut L) -> bool {
        match self.accumulator.flush_incomplete() {
            Some(record) => {
                warn!("Diagnostic stream ended before metadata was complete");
                listener.on_metadata(record);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> MetadataState {
        self.accumulator.state()
    }

    /// Whether metadata ended normally rather than through [`Self::finish`].
    pub fn metadata_complete(&self) -> bool {
        self.accumulator.is_complete()
    }

    /// Most recent non-empty line, used as failure context.
    pub fn last_line(&self) -> Option<&str> {
        (!self.last_line.is_empty()).then_some(self.last_line.as_str())
    }

    pub fn progress_events(&self) -> u64 {
        self.progress_events
    }

    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }
}
