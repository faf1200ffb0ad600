// Logger configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" | "bunyan" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub service_name: String,
    pub log_level: String,
    pub format: LogFormat,
    /// Directory for the daily-rolling log file, console only when unset
    pub log_directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            service_name: "intake-gateway".to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            log_directory: None,
            file_prefix: "intake-gateway.log".to_string(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from `LOG_LEVEL`, `LOG_FORMAT` and `LOG_DIR`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let log_level = std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or(defaults.format);

        let log_directory = std::env::var("LOG_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            log_level,
            format,
            log_directory,
            ..defaults
        }
    }
}
