pub mod command;
pub mod config;
pub mod duration;
pub mod engine;
pub mod metrics;
pub mod parser;
pub mod testing;

pub use command::{EngineCommand, Source, Target};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, MetricsConfig,
};
pub use duration::{format_timestamp, parse_timestamp, TimestampError};
pub use engine::{
    drive_diagnostics, Engine, EngineConfig, EngineError, FfmpegEngine, RunIo, RunOutcome,
};
pub use parser::{
    DiagnosticParser, MediaSection, MetadataRecord, ParseError, ParserEvent, ParserListener,
    ProgressRecord, StreamDescriptor, StreamKind,
};
