//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Levels must name or number a severity
//! - Bind address must be a socket address
//! - File prefix must be a plain file name
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;
use crate::logging::Level;

/// A single semantic problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let logging = &config.logging;
    for (field, value) in [
        ("logging.level", &logging.level),
        ("logging.capture_level", &logging.capture_level),
    ] {
        if let Err(e) = value.parse::<Level>() {
            errors.push(ValidationError::new(field, e.to_string()));
        }
    }

    let prefix = &logging.file_prefix;
    if prefix.trim().is_empty() {
        errors.push(ValidationError::new("logging.file_prefix", "must not be empty"));
    } else if prefix.contains(['/', '\\']) {
        errors.push(ValidationError::new(
            "logging.file_prefix",
            format!("'{prefix}' must not contain path separators"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
