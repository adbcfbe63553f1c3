//! Active recovery probing.
//!
//! # Responsibilities
//! - Periodically probe servers the pool has disabled
//! - Re-enable a server after enough consecutive successful probes

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthConfig;
use crate::http::url::merge;
use crate::pool::{Server, ServerPool};

pub struct RecoveryProber {
    pool: Arc<ServerPool>,
    config: HealthConfig,
    client: reqwest::Client,
    successes: HashMap<Server, u32>,
}

impl RecoveryProber {
    pub fn new(pool: Arc<ServerPool>, config: HealthConfig) -> Self {
        Self::with_client(pool, config, reqwest::Client::new())
    }

    pub fn with_client(pool: Arc<ServerPool>, config: HealthConfig, client: reqwest::Client) -> Self {
        Self {
            pool,
            config,
            client,
            successes: HashMap::new(),
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Recovery probing disabled");
            return;
        }

        tracing::info!(
            interval = self.config.probe_interval_secs,
            path = %self.config.probe_path,
            "Recovery prober starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.probe_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_inactive().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Recovery prober received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every inactive server once. Returns the servers re-enabled.
    pub async fn probe_inactive(&mut self) -> Vec<Server> {
        let inactive = self.pool.inactive();
        self.successes.retain(|server, _| inactive.contains(server));

        let mut restored = Vec::new();
        for server in inactive {
            if !self.probe(&server).await {
                self.successes.remove(&server);
                continue;
            }

            let count = self.successes.entry(server.clone()).or_insert(0);
            *count += 1;
            if *count < self.config.healthy_threshold {
                tracing::debug!(server = %server, successes = *count, "Probe succeeded");
                continue;
            }

            self.successes.remove(&server);
            match self.pool.enable(&server) {
                Ok(()) => restored.push(server),
                Err(e) => tracing::error!(server = %server, error = %e, "Failed to enable server"),
            }
        }
        restored
    }

    async fn probe(&self, server: &Server) -> bool {
        let url = match merge(server, &self.config.probe_path) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(server = %server, error = %e, "Failed to build probe URL");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.probe_timeout_secs);
        match time::timeout(timeout, self.client.get(url).send()).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(server = %server, status = %response.status(), "Probe failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(server = %server, error = %e, "Probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(server = %server, "Probe failed: timeout");
                false
            }
        }
    }
}
