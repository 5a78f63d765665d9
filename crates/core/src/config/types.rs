use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Print the Prometheus text exposition when a run ends
    #[serde(default)]
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[engine]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 120
event_buffer = 16
log_level = "verbose"
extra_args = ["-nostdin", "-hide_banner"]

[metrics]
enabled = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.engine.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.engine.timeout_secs, 120);
        assert_eq!(config.engine.event_buffer, 16);
        assert_eq!(config.engine.log_level, "verbose");
        assert_eq!(config.engine.extra_args.len(), 2);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.engine.timeout_secs, 3600);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_deserialize_partial_engine_section() {
        let toml = r#"
[engine]
timeout_secs = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.timeout_secs, 5);
        assert_eq!(config.engine.log_level, "info");
    }
}
