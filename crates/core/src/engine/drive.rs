//! The loop that feeds the diagnostic pipe into a parser.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::parser::{DiagnosticParser, LineSplitter, ParserEvent};

const READ_CHUNK: usize = 8 * 1024;

/// Forwards buffered events, going quiet once the receiver is gone.
pub(crate) struct EventForwarder<'a> {
    tx: Option<&'a mpsc::Sender<ParserEvent>>,
    buffer: Vec<ParserEvent>,
}

impl<'a> EventForwarder<'a> {
    pub(crate) fn new(tx: &'a mpsc::Sender<ParserEvent>) -> Self {
        Self {
            tx: Some(tx),
            buffer: Vec::new(),
        }
    }

    pub(crate) fn buffer(&mut self) -> &mut Vec<ParserEvent> {
        &mut self.buffer
    }

    pub(crate) async fn flush(&mut self) {
        for event in self.buffer.drain(..) {
            let Some(tx) = self.tx else {
                continue;
            };
            if tx.send(event).await.is_err() {
                debug!("Event receiver dropped, continuing without events");
                self.tx = None;
            }
        }
    }
}

/// Reports metadata still being accumulated when the read loop was cut
/// short by a timeout or an I/O error.
pub(crate) async fn finish_interrupted(
    parser: &mut DiagnosticParser,
    events: &mpsc::Sender<ParserEvent>,
) {
    let mut forwarder = EventForwarder::new(events);
    if parser.finish(forwarder.buffer()) {
        debug!("Flushed partial metadata after interrupted read");
    }
    forwarder.flush().await;
}

/// Reads the diagnostic channel to its end, feeding every line to `parser`
/// and forwarding the resulting events.
///
/// When the reader hits end of stream the trailing partial line is fed and
/// the parser is finished, so an unterminated metadata phase is flushed.
pub async fn drive_diagnostics<R>(
    mut reader: R,
    parser: &mut DiagnosticParser,
    events: &mpsc::Sender<ParserEvent>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut splitter = LineSplitter::new();
    let mut forwarder = EventForwarder::new(events);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        for line in splitter.push(&chunk[..read]) {
            parser.feed_line(&line, forwarder.buffer());
            forwarder.flush().await;
        }
    }

    if let Some(line) = splitter.finish() {
        parser.feed_line(&line, forwarder.buffer());
    }
    parser.finish(forwarder.buffer());
    forwarder.flush().await;
    Ok(())
}
