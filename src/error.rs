//! Client error taxonomy.
//!
//! # Design Decisions
//! - Configuration, method and pool errors are raised before any I/O
//! - Transport failures are carried unchanged from `reqwest`
//! - Cache misses, missing etags and unknown content types are not errors

use thiserror::Error;

use crate::cache::CacheError;

/// Errors that can occur while issuing a request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server URL or merged URL is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `Content-Length` header present but not an integer.
    #[error("Invalid Content-Length header: {0:?}")]
    Parse(String),

    /// Verb outside GET, PATCH, POST, PUT, DELETE.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Every configured server is disabled.
    #[error("No active servers remain in the pool")]
    PoolExhausted,

    /// Health signal for a server that was never configured.
    #[error("Server {0} is not part of the configured pool")]
    UnknownServer(String),

    /// Transport-level failure (connection refused, reset, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request did not complete within the configured deadline.
    #[error("Request to {url} timed out after {millis} ms")]
    Timeout { url: String, millis: u128 },

    /// A registered decoder rejected the response body.
    #[error("Failed to decode {content_type} body: {reason}")]
    Decode {
        content_type: String,
        reason: String,
    },

    /// Cache backend failure.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl ClientError {
    /// True for failures that say something about the server's health.
    pub fn is_health_relevant(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout { .. })
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
