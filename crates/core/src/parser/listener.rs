//! Observer surface for parser output.

use super::error::ParseError;
use super::types::{MetadataRecord, ProgressRecord};

/// Receives records as the parser produces them.
///
/// All methods default to doing nothing, so implementors only override what
/// they care about.
pub trait ParserListener {
    /// Called exactly once per run, when the metadata phase ends.
    fn on_metadata(&mut self, _record: MetadataRecord) {}

    /// Called once per recognised progress line.
    fn on_progress(&mut self, _record: ProgressRecord) {}

    /// Called for a recognised line that could not be interpreted.
    fn on_parse_error(&mut self, _line: &str, _error: ParseError) {}
}

/// Owned form of every listener callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserEvent {
    Metadata(MetadataRecord),
    Progress(ProgressRecord),
    ParseError { line: String, error: ParseError },
}

/// Collects events in arrival order, for draining after each line.
impl ParserListener for Vec<ParserEvent> {
    fn on_metadata(&mut self, record: MetadataRecord) {
        self.push(ParserEvent::Metadata(record));
    }

    fn on_progress(&mut self, record: ProgressRecord) {
        self.push(ParserEvent::Progress(record));
    }

    fn on_parse_error(&mut self, line: &str, error: ParseError) {
        self.push(ParserEvent::ParseError {
            line: line.to_string(),
            error,
        });
    }
}
