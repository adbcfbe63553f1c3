//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! ETag middleware
//!     → etag.rs (two-key protocol: request id → etag, etag → response)
//!     → CacheStore (get/set of opaque bytes)
//!         - memory.rs (in-process DashMap)
//!         - memcached.rs (networked, key prefix namespace)
//! ```
//!
//! # Design Decisions
//! - Stores are owned by the client instance, never process globals
//! - Callers only see `get`/`set`; which backend is in use is invisible
//! - No client-side eviction

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod etag;
pub mod memcached;
pub mod memory;

pub use etag::{CachedResponse, EtagCache};
pub use memcached::MemcachedStore;
pub use memory::MemoryStore;

/// Errors raised by cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Unexpected cache server reply: {0}")]
    Protocol(String),

    #[error("Cache value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value store backing the conditional cache.
#[async_trait]
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;
}

/// Shared handle to a cache store.
pub type SharedCache = Arc<dyn CacheStore>;
