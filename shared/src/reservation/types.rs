//! Shared status vocabularies for seats, orders and tickets

use serde::{Deserialize, Serialize};

// ============================================================================
// Seat Status
// ============================================================================

/// Seat availability state
///
/// The authoritative copy lives in the seat ledger; every transition is
/// owned by the reservation manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    /// 可售
    Available,
    /// Held by a pending order
    InTransaction,
    /// Sold and settled
    Booked,
    /// Held back by the organizer (not sellable)
    Reserved,
    /// Soft-removed from the layout (only while un-sold)
    NotAvailable,
}

impl SeatStatus {
    /// Whether a buyer may claim this seat right now
    pub fn is_sellable(&self) -> bool {
        matches!(self, SeatStatus::Available)
    }
}

// ============================================================================
// Order Status
// ============================================================================

/// Order lifecycle state: `Pending → {Completed | Cancelled}`
///
/// `Pending` additionally expires to `Cancelled` via the sweeper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

// ============================================================================
// Ticket Status
// ============================================================================

/// Ticket scan state
///
/// Independent of the order's payment state: a completed order carries
/// `Enabled` tickets until the gate scans them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Enabled,
    Scanned,
    Deactivated,
}

// ============================================================================
// Settlement Reason
// ============================================================================

/// Why an order reached a terminal state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettleReason {
    /// Asynchronous payment-provider callback
    PaymentCallback,
    /// 买家主动取消
    BuyerCancelled,
    /// Hold timeout reclaimed by the sweeper
    Expired,
    /// Charge creation failed, order rolled back
    ProviderFailed,
}

// ============================================================================
// Buyer Contact
// ============================================================================

/// Buyer contact captured at checkout and snapshotted on the order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuyerContact {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
