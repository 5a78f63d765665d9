//! Per-line interpretation errors.

use thiserror::Error;

use crate::duration::TimestampError;

/// A recognised line whose contents could not be converted.
///
/// These never stop the diagnostic feed. The offending line is reported and
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A timestamp embedded in the line is not `H:MM:SS.mmm`.
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(#[from] TimestampError),

    /// The line has an unexpected structure for its kind.
    #[error("Malformed {kind} line: {reason}")]
    MalformedLine { kind: &'static str, reason: String },
}

impl ParseError {
    pub fn malformed_line(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            kind,
            reason: reason.into(),
        }
    }
}
