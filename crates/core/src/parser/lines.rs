//! Incremental splitting of the diagnostic byte stream into lines.

use tracing::debug;

/// Longest line held while waiting for a terminator. Longer runs are cut.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Turns arbitrary byte chunks into complete lines.
///
/// Both `\n` and `\r` end a line, since the engine redraws its status line
/// with carriage returns. Only the unterminated tail is buffered, and never
/// more than [`MAX_LINE_BYTES`] of it.
#[derive(Debug, Default)]
pub struct LineSplitter {
    partial: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk and returns the lines it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            self.append(&rest[..pos], &mut lines);
            if let Some(line) = self.take_line() {
                lines.push(line);
            }
            rest = &rest[pos + 1..];
        }
        self.append(rest, &mut lines);
        lines
    }

    fn append(&mut self, mut bytes: &[u8], lines: &mut Vec<String>) {
        while self.partial.len() + bytes.len() > MAX_LINE_BYTES {
            let room = MAX_LINE_BYTES - self.partial.len();
            self.partial.extend_from_slice(&bytes[..room]);
            bytes = &bytes[room..];
            debug!(limit = MAX_LINE_BYTES, "Cutting overlong diagnostic line");
            if let Some(line) = self.take_line() {
                lines.push(line);
            }
        }
        self.partial.extend_from_slice(bytes);
    }

    /// Returns the unterminated tail, if any, once the stream is closed.
    pub fn finish(&mut self) -> Option<String> {
        self.take_line()
    }

    /// Bytes held for the current incomplete line.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    fn take_line(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        Some(line)
    }
}
