//! Wire events for live seat-map subscribers

use super::types::{OrderStatus, SeatStatus};
use serde::{Deserialize, Serialize};

/// Reservation lifecycle event kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationEventType {
    OrderCreated,
    OrderCompleted,
    OrderCancelled,
    OrderExpired,
}

/// Per-seat entry in a `seat_status_changed` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatState {
    pub id: String,
    pub status: SeatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// `seat_status_changed` - published whenever seat availability moves
///
/// Field names are camelCase on the wire; seat-map clients consume the
/// payload as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatStatusChanged {
    pub event_type: ReservationEventType,
    /// The show/event whose seat map changed
    pub event_id: String,
    pub order_code: String,
    pub seats: Vec<SeatState>,
    pub timestamp: i64,
}

impl SeatStatusChanged {
    /// Publish topic for this event's seat map
    pub fn topic(&self) -> String {
        format!("events/{}/seats", self.event_id)
    }
}

/// Internal broadcast envelope
///
/// Fans out to in-process consumers: push transports forwarding to seat-map
/// clients, and the archive worker watching for terminal orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReservationEvent {
    SeatsChanged(SeatStatusChanged),
    OrderSettled {
        order_code: String,
        status: OrderStatus,
    },
}
