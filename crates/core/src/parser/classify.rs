//! Assigns each diagnostic line to the section of the log it belongs to.

/// Logical role of one diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `Input #0, mov,mp4, from 'in.mp4':`
    Input,
    /// `Output #0, mp4, to 'out.mp4':`
    Output,
    /// A bare `Metadata:` marker opening a `key: value` block.
    MetadataMarker,
    /// `Duration: 00:00:10.00, start: 0.000000, bitrate: 128 kb/s`
    Duration,
    /// `Stream mapping:`, the end of the metadata phase.
    StreamMapping,
    /// `Stream #0:0: Video: ...`
    Stream,
    /// `frame=  100 fps= 30 ...` or `size=  512kB time=...`
    Progress,
    /// Anything else, including `key: value` lines.
    Other,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::MetadataMarker => "metadata_marker",
            Self::Duration => "duration",
            Self::StreamMapping => "stream_mapping",
            Self::Stream => "stream",
            Self::Progress => "progress",
            Self::Other => "other",
        }
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Classifies a line. The first matching rule wins, so `Stream mapping:`
/// is never taken for a stream descriptor.
pub fn classify(line: &str) -> LineKind {
    let line = line.trim();
    if starts_with_ignore_case(line, "input") {
        LineKind::Input
    } else if starts_with_ignore_case(line, "output") {
        LineKind::Output
    } else if line.eq_ignore_ascii_case("metadata:") {
        LineKind::MetadataMarker
    } else if starts_with_ignore_case(line, "duration") {
        LineKind::Duration
    } else if starts_with_ignore_case(line, "stream mapping") {
        LineKind::StreamMapping
    } else if starts_with_ignore_case(line, "stream #") {
        LineKind::Stream
    } else if starts_with_ignore_case(line, "frame=") || starts_with_ignore_case(line, "size=") {
        LineKind::Progress
    } else {
        LineKind::Other
    }
}
