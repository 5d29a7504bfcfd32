//! Archive Worker - moves terminal orders off the hot tables
//!
//! Settlement enqueues the order inside its own transaction, so the queue
//! survives crashes; this worker drains it. Keeping the live order tables
//! small keeps sweeper scans and pending-order checks cheap.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use shared::ReservationEvent;

use super::storage::ReservationStorage;

const MAX_RETRY_COUNT: u32 = 3;
const QUEUE_SCAN_INTERVAL_SECS: u64 = 60;

/// Worker draining the pending-archive queue
pub struct ArchiveWorker {
    storage: ReservationStorage,
    shutdown: CancellationToken,
}

impl ArchiveWorker {
    pub fn new(storage: ReservationStorage, shutdown: CancellationToken) -> Self {
        Self { storage, shutdown }
    }

    /// Run until shutdown, consuming terminal events plus a periodic queue
    /// scan for entries missed while the process was down.
    pub async fn run(self, mut event_rx: broadcast::Receiver<ReservationEvent>) {
        tracing::info!("ArchiveWorker started");

        // Catch up on anything settled before a previous shutdown
        self.process_pending_queue();

        let mut scan_interval =
            tokio::time::interval(std::time::Duration::from_secs(QUEUE_SCAN_INTERVAL_SECS));

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("ArchiveWorker shutting down");
                    break;
                }
                event = event_rx.recv() => {
                    match event {
                        Ok(ReservationEvent::OrderSettled { order_code, .. }) => {
                            self.archive(&order_code);
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Archive worker lagged, falling back to queue scan");
                            self.process_pending_queue();
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Event channel closed, shutting down ArchiveWorker");
                            break;
                        }
                    }
                }
                _ = scan_interval.tick() => {
                    self.process_pending_queue();
                }
            }
        }
    }

    fn archive(&self, order_code: &str) {
        match self.storage.archive_order(order_code) {
            Ok(true) => tracing::debug!(order_code = %order_code, "Order archived"),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(order_code = %order_code, error = %e, "Archive attempt failed");
                if let Err(e) = self.storage.bump_archive_retry(order_code, &e.to_string()) {
                    tracing::error!(order_code = %order_code, error = %e, "Failed to record archive retry");
                }
            }
        }
    }

    /// Drain the persisted queue, retrying bounded times per order
    fn process_pending_queue(&self) {
        let pending = match self.storage.get_pending_archives() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read pending archive queue");
                return;
            }
        };

        for entry in pending {
            if entry.retry_count >= MAX_RETRY_COUNT {
                tracing::error!(
                    order_code = %entry.order_code,
                    retries = entry.retry_count,
                    last_error = entry.last_error.as_deref().unwrap_or("unknown"),
                    "Giving up archiving order, snapshot remains in the live table"
                );
                if let Err(e) = self.storage.remove_pending_archive(&entry.order_code) {
                    tracing::error!(order_code = %entry.order_code, error = %e, "Failed to drop archive queue entry");
                }
                continue;
            }
            self.archive(&entry.order_code);
        }
    }
}
