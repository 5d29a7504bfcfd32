//! Expiry Sweeper
//!
//! Periodic reclamation of seats whose hold has exceeded its timeout. The
//! deadline lives in each order's persisted `expires_at`, so holds survive
//! process restarts; the first tick after startup immediately reclaims
//! anything that expired while the server was down.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use shared::util::now_millis;

use super::manager::ReservationManager;

/// Background task releasing expired holds
pub struct ExpirySweeper {
    manager: Arc<ReservationManager>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpirySweeper {
    pub fn new(
        manager: Arc<ReservationManager>,
        interval_secs: u64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager,
            interval: Duration::from_secs(interval_secs),
            shutdown,
        }
    }

    /// Run until shutdown. Each tick sweeps independently; a failing order
    /// never aborts the rest of the sweep.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "ExpirySweeper started");

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("ExpirySweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.manager.sweep_expired(now_millis());
                    if !report.expired.is_empty() {
                        tracing::info!(
                            checked = report.checked,
                            released = report.expired.len(),
                            "Expired holds reclaimed"
                        );
                    }
                    if report.failed > 0 {
                        tracing::warn!(failed = report.failed, "Some expired orders failed to release");
                    }
                }
            }
        }
    }
}
