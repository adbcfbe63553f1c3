//! Passive health checking (failure detection).
//!
//! # Responsibilities
//! - Observe call outcomes published by a `Resource`
//! - Track consecutive failures per server
//! - Disable a server on threshold breach
//!
//! # Design Decisions
//! - Only transport errors and timeouts count as failures; any HTTP status
//!   means the server answered
//! - A lagging subscriber skips the missed events rather than stopping

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::health::HealthEvent;
use crate::pool::{Server, ServerPool};

#[derive(Debug)]
pub struct PassiveHealthMonitor {
    pool: Arc<ServerPool>,
    failure_threshold: u32,
    failures: HashMap<Server, u32>,
}

impl PassiveHealthMonitor {
    pub fn new(pool: Arc<ServerPool>, failure_threshold: u32) -> Self {
        Self {
            pool,
            failure_threshold: failure_threshold.max(1),
            failures: HashMap::new(),
        }
    }

    /// Consecutive failures currently counted against `server`.
    pub fn failures(&self, server: &Server) -> u32 {
        self.failures.get(server).copied().unwrap_or(0)
    }

    /// Apply one event. Returns `true` if the server was disabled by it.
    pub fn observe(&mut self, event: &HealthEvent) -> bool {
        match event {
            HealthEvent::Success { server } => {
                self.failures.remove(server);
                false
            }
            HealthEvent::Failure { server, reason } => {
                let count = self.failures.entry(server.clone()).or_insert(0);
                *count += 1;
                tracing::debug!(server = %server, failures = *count, reason = %reason, "Failure observed");
                if *count < self.failure_threshold {
                    return false;
                }

                self.failures.remove(server);
                if !self.pool.is_active(server) {
                    return false;
                }
                match self.pool.disable(server) {
                    Ok(()) => {
                        tracing::warn!(
                            server = %server,
                            threshold = self.failure_threshold,
                            "Disabling server after consecutive failures"
                        );
                        true
                    }
                    Err(e) => {
                        tracing::error!(server = %server, error = %e, "Failed to disable server");
                        false
                    }
                }
            }
        }
    }

    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<HealthEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(threshold = self.failure_threshold, "Passive health monitor starting");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        self.observe(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Passive health monitor lagged behind");
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("Health event channel closed, exiting loop");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Passive health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
