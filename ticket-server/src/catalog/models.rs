//! Catalog Models

use serde::{Deserialize, Serialize};
use shared::SeatStatus;

use crate::payments::ProviderCredentials;

/// One sellable position in a venue layout
///
/// Created at layout setup time. Status transitions after setup are owned
/// exclusively by the reservation manager; a seat referenced by a
/// historical order is never hard-deleted, only soft-removed
/// (`NotAvailable`) while un-sold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub seat_id: String,
    pub venue_id: String,
    /// Label as printed on the venue map, e.g. "A1"
    pub label: String,
    pub row: u32,
    pub column: u32,
    /// Unassigned seats are not sellable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub status: SeatStatus,
}

/// A named class of tickets scoped to one event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketCategory {
    pub category_id: String,
    pub event_id: String,
    pub name: String,
    /// Display color for seat-map rendering, e.g. "#d4af37"
    pub color: String,
    /// Fallback price when no timebound window matches
    pub base_price: f64,
}

/// A price valid only within a specific time window (inclusive bounds)
///
/// Windows for one category must never overlap; at most one price is
/// active per category at any instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeboundPrice {
    pub price_id: String,
    pub category_id: String,
    /// Window start, UTC milliseconds (inclusive)
    pub starts_at: i64,
    /// Window end, UTC milliseconds (inclusive)
    pub ends_at: i64,
    pub price: f64,
}

impl TimeboundPrice {
    /// Whether `at` falls inside this window
    pub fn contains(&self, at: i64) -> bool {
        self.starts_at <= at && at <= self.ends_at
    }
}

/// Per-event selling configuration
///
/// Payment provider selection and credentials are per event, never global
/// state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventConfig {
    pub event_id: String,
    pub name: String,
    pub venue_id: String,
    /// ISO 4217 currency code, e.g. "IDR"
    pub currency: String,
    /// Tax percentage applied on top of the ticket subtotal
    pub tax_percent: f64,
    /// Registry key of the payment provider for this event
    pub provider: String,
    pub credentials: ProviderCredentials,
}
