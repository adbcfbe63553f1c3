//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every server URL is usable as a merge base
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Check backend-specific requirements (memcached needs an address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::cache::memcached::{HASHED_KEY_OVERHEAD, MAX_KEY_LEN};
use crate::config::schema::{CacheBackend, ClientConfig};
use crate::pool::Server;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::new("servers", "at least one server is required"));
    }
    for (i, raw) in config.servers.iter().enumerate() {
        if let Err(e) = Server::parse(raw) {
            errors.push(ValidationError::new(format!("servers[{i}]"), e.to_string()));
        }
    }

    if config.client.timeout_secs == 0 {
        errors.push(ValidationError::new("client.timeout_secs", "must be greater than 0"));
    }
    if config.client.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "client.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.cache.backend == CacheBackend::Memcached {
        match config.cache.address.as_deref() {
            None | Some("") => errors.push(ValidationError::new(
                "cache.address",
                "required for the memcached backend",
            )),
            Some(_) => {}
        }
        if config.cache.op_timeout_ms == 0 {
            errors.push(ValidationError::new("cache.op_timeout_ms", "must be greater than 0"));
        }
    }
    if config.cache.prefix.trim().is_empty() {
        errors.push(ValidationError::new("cache.prefix", "must not be empty"));
    } else if config.cache.prefix.len() + HASHED_KEY_OVERHEAD > MAX_KEY_LEN {
        errors.push(ValidationError::new(
            "cache.prefix",
            format!(
                "must be at most {} bytes so hashed keys fit memcached's {MAX_KEY_LEN} byte limit",
                MAX_KEY_LEN - HASHED_KEY_OVERHEAD
            ),
        ));
    }

    let health = &config.health;
    if health.failure_threshold == 0 {
        errors.push(ValidationError::new("health.failure_threshold", "must be greater than 0"));
    }
    if health.healthy_threshold == 0 {
        errors.push(ValidationError::new("health.healthy_threshold", "must be greater than 0"));
    }
    if health.probe_interval_secs == 0 {
        errors.push(ValidationError::new("health.probe_interval_secs", "must be greater than 0"));
    }
    if health.probe_timeout_secs == 0 {
        errors.push(ValidationError::new("health.probe_timeout_secs", "must be greater than 0"));
    }
    if !health.probe_path.starts_with('/') {
        errors.push(ValidationError::new("health.probe_path", "must start with '/'"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
