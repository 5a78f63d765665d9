//! State machine that builds the metadata record from classified lines.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

use super::classify::LineKind;
use super::error::ParseError;
use super::fields::{decimal_multiplier, extract_stream};
use super::types::{MediaSection, MetadataRecord, Tags};
use crate::duration::parse_timestamp;

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:input|output)\s+#(\d+),\s*(.+?),\s*(?:from|to)\s+'(.*)'").unwrap()
});

static DURATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^duration:\s*([^,]+)").unwrap());

static CONTAINER_BITRATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bitrate:\s*(\d+)\s*(k|m)?b/s").unwrap());

/// Marker the engine prints when the input starts at offset zero.
const SYNCHED_MARKER: &str = "start: 0.000000";

/// Lifecycle of the metadata phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataState {
    Parsing,
    /// The record has been handed off. Entered exactly once.
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Input,
    Output,
}

/// Where free-form `key: value` lines currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataTarget {
    None,
    Section,
    TailStream,
}

/// Owns the in-progress [`MetadataRecord`] until the metadata phase ends.
#[derive(Debug)]
pub struct MetadataAccumulator {
    state: MetadataState,
    record: MetadataRecord,
    current: Option<SectionKind>,
    target: MetadataTarget,
    input_duration_ms: Option<u64>,
    completed: bool,
}

impl Default for MetadataAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataAccumulator {
    pub fn new() -> Self {
        Self {
            state: MetadataState::Parsing,
            record: MetadataRecord::default(),
            current: None,
            target: MetadataTarget::None,
            input_duration_ms: None,
            completed: false,
        }
    }

    pub fn state(&self) -> MetadataState {
        self.state
    }

    /// Input duration, still available after the record was handed off.
    pub fn input_duration_ms(&self) -> Option<u64> {
        self.input_duration_ms
    }

    /// True once the phase ended through a stream-mapping or progress line.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Applies one classified, trimmed line.
    ///
    /// Returns the finished record on the line that ends the metadata phase.
    /// Once ended, only that transition's line kinds are inspected and
    /// everything else is ignored.
    pub fn apply(
        &mut self,
        kind: LineKind,
        line: &str,
    ) -> Result<Option<MetadataRecord>, ParseError> {
        if self.state == MetadataState::Ended {
            return Ok(None);
        }

        match kind {
            LineKind::StreamMapping | LineKind::Progress => return Ok(Some(self.end(true))),
            LineKind::Input => self.begin_section(SectionKind::Input, line),
            LineKind::Output => self.begin_section(SectionKind::Output, line),
            LineKind::MetadataMarker => self.open_metadata_block(),
            LineKind::Duration => self.apply_duration(line)?,
            LineKind::Stream => self.push_stream(line)?,
            LineKind::Other => self.store_tag(line),
        }
        Ok(None)
    }

    /// Ends the phase without a terminal line, returning the partial record.
    ///
    /// Returns `None` when the phase already ended.
    pub fn flush_incomplete(&mut self) -> Option<MetadataRecord> {
        match self.state {
            MetadataState::Parsing => Some(self.end(false)),
            MetadataState::Ended => None,
        }
    }

    fn end(&mut self, complete: bool) -> MetadataRecord {
        debug!(complete, "Metadata phase ended");
        self.state = MetadataState::Ended;
        self.completed = complete;
        self.current = None;
        self.target = MetadataTarget::None;
        let mut record = std::mem::take(&mut self.record);
        record.complete = complete;
        record
    }

    fn section_mut(&mut self) -> Option<&mut MediaSection> {
        match self.current? {
            SectionKind::Input => Some(&mut self.record.input),
            SectionKind::Output => Some(&mut self.record.output),
        }
    }

    fn begin_section(&mut self, kind: SectionKind, line: &str) {
        debug!(section = ?kind, "Section header");
        self.current = Some(kind);
        self.target = MetadataTarget::None;

        let Some(caps) = SECTION_HEADER.captures(line) else {
            return;
        };
        let Some(section) = self.section_mut() else {
            return;
        };
        // A repeated header keeps the first header's identity.
        if section.index.is_none() {
            section.index = caps.get(1).and_then(|m| m.as_str().parse().ok());
            section.format = caps.get(2).map(|m| m.as_str().trim().to_string());
            section.location = caps.get(3).map(|m| m.as_str().to_string());
        }
    }

    fn open_metadata_block(&mut self) {
        self.target = match self.section_mut() {
            Some(section) if !section.streams.is_empty() => MetadataTarget::TailStream,
            Some(_) => MetadataTarget::Section,
            None => MetadataTarget::None,
        };
    }

    fn apply_duration(&mut self, line: &str) -> Result<(), ParseError> {
        self.target = MetadataTarget::None;
        if self.current != Some(SectionKind::Input) {
            return Ok(());
        }

        let raw = DURATION
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .ok_or_else(|| ParseError::malformed_line("duration", "no timestamp"))?;

        let duration_ms = if raw.eq_ignore_ascii_case("N/A") {
            None
        } else {
            Some(parse_timestamp(raw)?)
        };
        let bitrate = CONTAINER_BITRATE.captures(line).and_then(|caps| {
            let base: u64 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2).map(|m| m.as_str());
            base.checked_mul(decimal_multiplier(unit)).filter(|b| *b != 0)
        });

        let input = &mut self.record.input;
        input.duration_ms = duration_ms.filter(|d| *d != 0);
        input.bitrate = bitrate;
        input.synched = line.contains(SYNCHED_MARKER);
        self.input_duration_ms = input.duration_ms;
        Ok(())
    }

    fn push_stream(&mut self, line: &str) -> Result<(), ParseError> {
        self.target = MetadataTarget::None;
        let stream = extract_stream(line);
        let section = self.section_mut().ok_or_else(|| {
            ParseError::malformed_line("stream", "stream listed outside an input or output")
        })?;
        debug!(kind = ?stream.kind(), codec = ?stream.codec, "Stream descriptor");
        section.streams.push(stream);
        Ok(())
    }

    fn store_tag(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            return;
        };
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        let value = value.trim();

        let target = self.target;
        let Some(section) = self.section_mut() else {
            return;
        };
        match target {
            MetadataTarget::None => {}
            MetadataTarget::Section => section.metadata.insert(key, value),
            MetadataTarget::TailStream => {
                if let Some(stream) = section.streams.last_mut() {
                    stream
                        .metadata
                        .get_or_insert_with(Tags::new)
                        .insert(key, value);
                }
            }
        }
    }
}
