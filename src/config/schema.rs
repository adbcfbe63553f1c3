//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::memcached::DEFAULT_MAX_ITEM_SIZE;

/// Root configuration for a client resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server base URLs, in rotation order.
    pub servers: Vec<String>,

    /// Per-call behaviour.
    pub client: ClientSettings,

    /// Cache backend selection.
    pub cache: CacheConfig,

    /// Which built-in middleware stages to install.
    pub middleware: MiddlewareConfig,

    /// Passive/active health policy.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: vec!["http://localhost:8000/".to_string()],
            client: ClientSettings::default(),
            cache: CacheConfig::default(),
            middleware: MiddlewareConfig::default(),
            health: HealthConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Total deadline for one call, in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Prefer the server that last answered.
    pub sticky: bool,

    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 5,
            sticky: false,
            user_agent: concat!("restlink/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Memcached,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Memcached `host:port`. Required for the memcached backend.
    pub address: Option<String>,

    /// Namespace prepended to every memcached key.
    pub prefix: String,

    /// Memcached expiry in seconds (0 = never).
    pub expiry_secs: u32,

    /// Per-operation deadline for memcached, in milliseconds.
    pub op_timeout_ms: u64,

    pub max_idle_connections: usize,

    /// Largest memcached value accepted on `get`, in bytes.
    pub max_item_bytes: usize,

    /// Snapshot file for the memory backend.
    pub persistence_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            address: None,
            prefix: "restlink".to_string(),
            expiry_secs: 0,
            op_timeout_ms: 500,
            max_idle_connections: 4,
            max_item_bytes: DEFAULT_MAX_ITEM_SIZE,
            persistence_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Conditional GET with `If-None-Match`.
    pub etag: bool,

    /// Attach an `x-request-id` header.
    pub request_id: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            etag: true,
            request_id: true,
        }
    }
}

/// Health policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Run the passive monitor and the recovery prober.
    pub enabled: bool,

    /// Consecutive failures before a server is disabled.
    pub failure_threshold: u32,

    /// Recovery probe interval in seconds.
    pub probe_interval_secs: u64,

    /// Recovery probe timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Path probed on disabled servers.
    pub probe_path: String,

    /// Consecutive probe successes before a server is re-enabled.
    pub healthy_threshold: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            failure_threshold: 3,
            probe_interval_secs: 10,
            probe_timeout_secs: 5,
            probe_path: "/".to_string(),
            healthy_threshold: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
