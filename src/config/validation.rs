//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect conflicting documentation paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// One semantic problem, keyed by its dotted config path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.api.title.trim().is_empty() {
        errors.push(ValidationError::new("api.title", "must not be empty"));
    }
    if config.api.version.trim().is_empty() {
        errors.push(ValidationError::new("api.version", "must not be empty"));
    }
    for (i, server) in config.api.servers.iter().enumerate() {
        if server.url.trim().is_empty() {
            errors.push(ValidationError::new(
                &format!("api.servers[{}].url", i),
                "must not be empty",
            ));
        }
    }

    if config.docs.enabled {
        for (field, path) in [
            ("docs.spec_path", &config.docs.spec_path),
            ("docs.ui_path", &config.docs.ui_path),
        ] {
            if !path.starts_with('/') {
                errors.push(ValidationError::new(field, "must start with '/'"));
            }
        }
        if config.docs.spec_path == config.docs.ui_path {
            errors.push(ValidationError::new(
                "docs.ui_path",
                "must differ from docs.spec_path",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
