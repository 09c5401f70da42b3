//! Active health checking.

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::routing::Router;

pub struct HealthMonitor {
    router: Arc<Router>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(router: Arc<Router>, config: HealthCheckConfig) -> Self {
        Self { router, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every non-baseline source once.
    pub async fn check_all(&self) {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let thresholds = self.config.thresholds();

        let mut probes: FuturesUnordered<_> = self
            .router
            .probe_targets()
            .into_iter()
            .map(|(key, adapter)| {
                let path = self.config.path.clone();
                async move {
                    let healthy = match time::timeout(timeout, adapter.probe(&path)).await {
                        Ok(healthy) => healthy,
                        Err(_) => {
                            tracing::warn!(source = %key, "Probe failed: timeout");
                            false
                        }
                    };
                    (key, healthy)
                }
            })
            .collect();

        while let Some((key, healthy)) = probes.next().await {
            tracing::debug!(source = %key, healthy, "Probe settled");
            self.router.record_probe(&key, healthy, thresholds);
        }
    }
}
