//! Configuration for the engine transport.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ffmpeg-based engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Timeout for a single run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Capacity of the parser event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Engine log level passed as `-loglevel`. Empty leaves the engine default.
    /// Must stay at `info` or above for the stream header to be printed.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Additional global arguments placed before every command.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_event_buffer() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_timeout(),
            event_buffer: default_event_buffer(),
            log_level: default_log_level(),
            extra_args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the event channel capacity.
    pub fn with_event_buffer(mut self, event_buffer: usize) -> Self {
        self.event_buffer = event_buffer;
        self
    }

    /// Global arguments that precede the compiled command.
    pub fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.log_level.is_empty() {
            args.extend(["-loglevel".to_string(), self.log_level.clone()]);
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}
