//! Order snapshot - the single persisted record per purchase attempt
//!
//! 订单快照：每个订单一条记录，票随单内嵌存储。

use super::types::{BuyerContact, OrderStatus, SettleReason, TicketStatus};
use serde::{Deserialize, Serialize};

/// One ticket bound to one seat for one event
///
/// `price` is snapshotted at issuance, never re-computed from live price
/// windows afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketSnapshot {
    /// Snowflake ticket ID
    pub ticket_id: i64,
    pub seat_id: String,
    /// Seat label as printed on the venue map, e.g. "A1"
    pub seat_label: String,
    pub category_id: String,
    /// Category name snapshot (for receipts/statistics)
    pub category_name: String,
    pub price: f64,
    pub status: TicketStatus,
}

/// Persisted slice of the payment provider's charge response
///
/// Enough to reconcile against the provider and to resume checkout when
/// the buyer loses the accessor client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChargeRecord {
    /// Provider name, e.g. "midtrans"
    pub provider: String,
    /// Opaque accessor token returned by the provider
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Provider-side transaction reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    /// Raw provider response body (reconciliation)
    pub raw: serde_json::Value,
    pub created_at: i64,
}

/// Record of the settlement that closed an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementRecord {
    pub outcome: OrderStatus,
    pub reason: SettleReason,
    /// Provider callback payload that triggered the settlement, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_payload: Option<serde_json::Value>,
    pub settled_at: i64,
}

/// Full order state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Human-readable order code, e.g. "ORD202508050001"
    pub order_code: String,
    pub event_id: String,
    pub buyer_id: String,
    pub contact: BuyerContact,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax: f64,
    pub total_price: f64,
    pub tickets: Vec<TicketSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<ChargeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementRecord>,
    pub created_at: i64,
    /// Hold deadline; past this instant the sweeper reclaims the seats
    pub expires_at: i64,
}

impl OrderSnapshot {
    /// Whether the order can still transition
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the hold deadline has passed at `now`
    pub fn is_expired(&self, now: i64) -> bool {
        self.status == OrderStatus::Pending && self.expires_at <= now
    }

    /// Seat IDs claimed by this order
    pub fn seat_ids(&self) -> Vec<String> {
        self.tickets.iter().map(|t| t.seat_id.clone()).collect()
    }
}
