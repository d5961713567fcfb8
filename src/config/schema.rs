//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default, so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::Rotation;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Logging pipeline settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:9119").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9119".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Threshold of the console and file sinks (name or number).
    pub level: String,

    /// Adds a diagnostic file sink at TRACE.
    pub debug_mode: bool,

    /// Directory holding the log files.
    pub log_dir: PathBuf,

    /// File name prefix; the start timestamp is appended.
    pub file_prefix: String,

    /// How often the log files roll over.
    pub rotation: RotationPolicy,

    /// Level given to captured stdout text.
    pub capture_level: String,

    /// Redirect the process's fd 1 into the pipeline (unix only).
    pub capture_stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            debug_mode: false,
            log_dir: PathBuf::from("logs"),
            file_prefix: "obgw-log".to_string(),
            rotation: RotationPolicy::default(),
            capture_level: "INFO".to_string(),
            capture_stdout: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Never,
    Minutely,
    Hourly,
    Daily,
}

impl RotationPolicy {
    pub fn rotation(self) -> Rotation {
        match self {
            RotationPolicy::Never => Rotation::NEVER,
            RotationPolicy::Minutely => Rotation::MINUTELY,
            RotationPolicy::Hourly => Rotation::HOURLY,
            RotationPolicy::Daily => Rotation::DAILY,
        }
    }
}
