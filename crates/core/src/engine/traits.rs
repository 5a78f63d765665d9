//! Trait definitions for the engine transport.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::EngineError;
use super::types::{RunIo, RunOutcome};
use crate::command::EngineCommand;
use crate::parser::ParserEvent;

/// Something that can execute an [`EngineCommand`] and report its
/// diagnostic output as parser events.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Validates that the engine is properly configured and ready.
    async fn validate(&self) -> Result<(), EngineError>;

    /// Runs a command to completion.
    ///
    /// Parser events are sent on `events` in the order their lines arrived.
    /// If the receiver is dropped, the run continues without events.
    async fn run(
        &self,
        command: &EngineCommand,
        io: RunIo,
        events: mpsc::Sender<ParserEvent>,
    ) -> Result<RunOutcome, EngineError>;
}
