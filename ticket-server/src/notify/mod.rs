//! Notification Publisher
//!
//! Best-effort fan-out of `seat_status_changed` events to live seat-map
//! subscribers. Publishing is never on the critical path: a down broker or
//! a missing subscriber must not fail a reservation or settlement.

use shared::SeatStatusChanged;
use tokio::sync::broadcast;

/// At-most-once, fire-and-forget event delivery
///
/// Implementations must never block or propagate errors into the calling
/// settlement path; failures are logged and swallowed.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &SeatStatusChanged);
}

/// Fan-out over a tokio broadcast channel
///
/// Push transports (websocket bridges, an MQTT forwarder) subscribe and
/// relay to their own clients; with no subscriber the event is dropped.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<(String, SeatStatusChanged)>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<(String, SeatStatusChanged)> {
        self.tx.subscribe()
    }
}

impl NotificationPublisher for BroadcastPublisher {
    fn publish(&self, topic: &str, payload: &SeatStatusChanged) {
        if self.tx.send((topic.to_string(), payload.clone())).is_err() {
            tracing::debug!(topic = %topic, "No live subscribers for seat event");
        }
    }
}

/// Discards every event (tests, broker-less deployments)
pub struct NoopPublisher;

impl NotificationPublisher for NoopPublisher {
    fn publish(&self, _topic: &str, _payload: &SeatStatusChanged) {}
}
