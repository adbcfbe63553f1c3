//! Server pool management.
//!
//! # Responsibilities
//! - Hand out the next active server in round-robin order
//! - Move servers between the active and inactive sets on health signals
//! - Keep the rotation cursor valid across membership changes

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ClientError, ClientResult};
use crate::observability::metrics;
use crate::pool::round_robin::RoundRobin;
use crate::pool::server::Server;

#[derive(Debug)]
struct PoolState {
    active: Vec<Server>,
    inactive: Vec<Server>,
    rotation: RoundRobin,
}

/// Point-in-time copy of the pool membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub active: Vec<Server>,
    pub inactive: Vec<Server>,
}

/// Thread-safe pool of candidate servers.
#[derive(Debug)]
pub struct ServerPool {
    /// Deduplicated servers in configured order. Never changes.
    configured: Vec<Server>,
    state: Mutex<PoolState>,
}

impl ServerPool {
    /// Create a pool with every server active.
    pub fn new(servers: impl IntoIterator<Item = Server>) -> ClientResult<Self> {
        let mut configured: Vec<Server> = Vec::new();
        for server in servers {
            if !configured.contains(&server) {
                configured.push(server);
            }
        }
        if configured.is_empty() {
            return Err(ClientError::Configuration(
                "Server pool needs at least one server".into(),
            ));
        }

        for server in &configured {
            metrics::record_server_health(server.as_str(), true);
        }

        Ok(Self {
            state: Mutex::new(PoolState {
                active: configured.clone(),
                inactive: Vec::new(),
                rotation: RoundRobin::new(),
            }),
            configured,
        })
    }

    /// Parse server URLs and build a pool.
    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> ClientResult<Self> {
        let servers = urls
            .iter()
            .map(|u| Server::parse(u.as_ref()))
            .collect::<ClientResult<Vec<_>>>()?;
        Self::new(servers)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_configured(&self, server: &Server) -> ClientResult<()> {
        if self.configured.contains(server) {
            Ok(())
        } else {
            Err(ClientError::UnknownServer(server.to_string()))
        }
    }

    /// Next active server in rotation.
    pub fn next(&self) -> ClientResult<Server> {
        let mut state = self.lock();
        let len = state.active.len();
        match state.rotation.advance(len) {
            Some(index) => Ok(state.active[index].clone()),
            None => {
                tracing::debug!(configured = self.configured.len(), "No active servers in pool");
                Err(ClientError::PoolExhausted)
            }
        }
    }

    /// Return `preferred` if it is active, otherwise the next server in rotation.
    pub fn next_preferring(&self, preferred: &Server) -> ClientResult<Server> {
        {
            let state = self.lock();
            if state.active.contains(preferred) {
                return Ok(preferred.clone());
            }
        }
        self.next()
    }

    /// Move a server to the inactive set. No-op if already inactive.
    pub fn disable(&self, server: &Server) -> ClientResult<()> {
        self.ensure_configured(server)?;
        let mut state = self.lock();
        let Some(index) = state.active.iter().position(|s| s == server) else {
            return Ok(());
        };

        let removed = state.active.remove(index);
        let new_len = state.active.len();
        state.rotation.on_removed(index, new_len);
        state.inactive.push(removed);

        tracing::warn!(server = %server, active = new_len, "Server disabled");
        metrics::record_server_health(server.as_str(), false);
        Ok(())
    }

    /// Move a server back to the active set at its configured position.
    /// No-op if already active.
    pub fn enable(&self, server: &Server) -> ClientResult<()> {
        self.ensure_configured(server)?;
        let mut state = self.lock();
        let Some(index) = state.inactive.iter().position(|s| s == server) else {
            return Ok(());
        };
        let restored = state.inactive.remove(index);

        // Position = number of active servers configured before it.
        let insert_at = self
            .configured
            .iter()
            .take_while(|s| *s != &restored)
            .filter(|s| state.active.contains(s))
            .count();
        state.active.insert(insert_at, restored);
        let new_len = state.active.len();
        state.rotation.on_inserted(insert_at, new_len);

        tracing::info!(server = %server, active = new_len, "Server enabled");
        metrics::record_server_health(server.as_str(), true);
        Ok(())
    }

    /// Whether the server is currently active.
    pub fn is_active(&self, server: &Server) -> bool {
        self.lock().active.contains(server)
    }

    /// All configured servers in configured order.
    pub fn configured(&self) -> &[Server] {
        &self.configured
    }

    /// Inactive servers, for recovery probing.
    pub fn inactive(&self) -> Vec<Server> {
        self.lock().inactive.clone()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.lock();
        PoolSnapshot {
            active: state.active.clone(),
            inactive: state.inactive.clone(),
        }
    }
}
