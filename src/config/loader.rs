//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_LOG_LEVEL: &str = "OBGW_LOGLEVEL";
pub const ENV_DEBUG_MODE: &str = "OBGW_DEBUG_MODE";
pub const ENV_LOG_DIR: &str = "OBGW_LOG_DIR";
pub const ENV_CAPTURE_STDOUT: &str = "OBGW_CAPTURE_STDOUT";
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Environment error: {}='{}' is not valid", var, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |var| std::env::var(var).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path).map_err(ConfigError::Io)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Overlay `OBGW_*` variables and `PORT` onto `config`.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = env(ENV_LOG_LEVEL) {
        config.logging.level = level.trim().to_string();
    }

    if let Some(value) = env(ENV_DEBUG_MODE) {
        config.logging.debug_mode = parse_bool(&value).ok_or(ConfigError::Env {
            var: ENV_DEBUG_MODE,
            value,
        })?;
    }

    if let Some(dir) = env(ENV_LOG_DIR) {
        config.logging.log_dir = dir.into();
    }

    if let Some(value) = env(ENV_CAPTURE_STDOUT) {
        config.logging.capture_stdout = parse_bool(&value).ok_or(ConfigError::Env {
            var: ENV_CAPTURE_STDOUT,
            value,
        })?;
    }

    if let Some(value) = env(ENV_PORT) {
        let port: u16 = match value.trim().parse() {
            Ok(port) => port,
            Err(_) => return Err(ConfigError::Env { var: ENV_PORT, value }),
        };
        let bind = &config.listener.bind_address;
        let host = bind.rsplit_once(':').map_or(bind.as_str(), |(host, _)| host);
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
