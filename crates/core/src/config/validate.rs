use super::{types::Config, ConfigError};

/// Engine log levels that suppress the stream header the parser reads
const QUIET_LOG_LEVELS: &[&str] = &["quiet", "panic", "fatal", "error", "warning"];

/// Validate configuration
/// Currently validates:
/// - Engine path is not empty
/// - Timeout and event buffer are not 0
/// - Engine log level still prints stream information
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let engine = &config.engine;

    if engine.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if engine.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs cannot be 0".to_string(),
        ));
    }

    if engine.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "engine.event_buffer cannot be 0".to_string(),
        ));
    }

    if QUIET_LOG_LEVELS
        .iter()
        .any(|level| engine.log_level.eq_ignore_ascii_case(level))
    {
        return Err(ConfigError::ValidationError(format!(
            "engine.log_level '{}' hides stream metadata, use 'info' or more verbose",
            engine.log_level
        )));
    }

    Ok(())
}
