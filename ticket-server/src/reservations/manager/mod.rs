//! ReservationManager - the order state machine
//!
//! Owns the hold→pay→settle lifecycle and every seat status transition.
//!
//! # Checkout Flow
//!
//! ```text
//! create_order(req)
//!     ├─ 1. Request validation (before any lock)
//!     ├─ 2. Rate-limit admission check (before any lock)
//!     ├─ 3. Begin write transaction
//!     │      ├─ reject if a pending order exists for (buyer, event)
//!     │      ├─ lock seats via SeatLedger (all-or-nothing)
//!     │      ├─ resolve prices, compute tax and total
//!     │      └─ persist OrderSnapshot in PENDING + indexes
//!     ├─ 4. Commit (seat lock held only for validate-and-flip)
//!     ├─ 5. Provider charge (outbound network, no lock held)
//!     │      ├─ ok  → attach ChargeRecord, return accessor
//!     │      └─ err → compensating transaction removes the order
//!     │              and releases the seats
//!     └─ 6. Broadcast seat_status_changed (fire-and-forget)
//! ```
//!
//! Settlement runs in one write transaction; redb's single writer is the
//! per-order lock, so a user cancel racing a provider callback cannot both
//! win - the loser sees a terminal order and no-ops.

mod error;
pub use error::*;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use shared::util::{now_millis, snowflake_id};
use shared::{
    BuyerContact, ChargeRecord, OrderSnapshot, OrderStatus, ReservationEvent,
    ReservationEventType, SeatState, SeatStatus, SettleReason, SettlementRecord, TicketSnapshot,
    TicketStatus,
};

use crate::catalog::Seat;
use crate::money;
use crate::notify::NotificationPublisher;
use crate::payments::{CallbackPayload, ChargeRequest, LineItem, PaymentAccessor, ProviderRegistry};
use crate::reservations::ledger::SeatLedger;
use crate::reservations::rate_limit::OrderRateLimiter;
use crate::reservations::storage::{ReservationStorage, StorageError};
use crate::utils::validation::{validate_contact, validate_seat_selection};
use crate::utils::AppError;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Tunables for the reservation lifecycle
#[derive(Debug, Clone)]
pub struct ReservationSettings {
    /// How long a pending order holds its seats
    pub hold_duration_ms: i64,
    pub max_orders_per_hour: u32,
    pub max_orders_per_day: u32,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            hold_duration_ms: 10 * 60 * 1000,
            max_orders_per_hour: 6,
            max_orders_per_day: 20,
        }
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

/// Checkout request
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub event_id: String,
    pub buyer_id: String,
    pub seat_ids: Vec<String>,
    pub contact: BuyerContact,
}

/// Checkout response - the accessor continues payment out-of-band
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub order_code: String,
    pub accessor: PaymentAccessor,
    pub total_price: f64,
    pub expires_at: i64,
}

/// Resume-payment handle for a pending order
#[derive(Debug, Clone, Serialize)]
pub struct ResumePayment {
    pub provider: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// A buyer's pending order as shown by the resume-payment flow
#[derive(Debug, Clone, Serialize)]
pub struct PendingOrderView {
    pub order_code: String,
    /// Seat labels, map order
    pub seats: Vec<String>,
    pub total_price: f64,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<ResumePayment>,
}

/// What a settlement call actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The order transitioned to the requested terminal state
    Applied,
    /// Idempotent no-op: already terminal, already the requested status,
    /// or a non-terminal (pending) outcome
    AlreadySettled,
}

/// One rejected entry of a bulk cancel
#[derive(Debug, Clone, Serialize)]
pub struct RejectedCancel {
    pub order_code: String,
    pub reason: String,
}

/// Result of a user-initiated bulk cancel
#[derive(Debug, Clone, Serialize, Default)]
pub struct CancelReport {
    pub cancelled: Vec<String>,
    pub rejected: Vec<RejectedCancel>,
}

/// Result of one sweep cycle
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub checked: usize,
    pub expired: Vec<String>,
    pub failed: usize,
}

// ============================================================================
// Manager
// ============================================================================

/// Reservation manager
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger a full resync.
pub struct ReservationManager {
    storage: ReservationStorage,
    providers: ProviderRegistry,
    publisher: Arc<dyn NotificationPublisher>,
    rate_limiter: OrderRateLimiter,
    event_tx: broadcast::Sender<ReservationEvent>,
    epoch: String,
    hold_duration_ms: i64,
}

impl std::fmt::Debug for ReservationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationManager")
            .field("providers", &self.providers)
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl ReservationManager {
    pub fn new(
        storage: ReservationStorage,
        providers: ProviderRegistry,
        publisher: Arc<dyn NotificationPublisher>,
        settings: ReservationSettings,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "ReservationManager started with new epoch");
        Self {
            storage,
            providers,
            publisher,
            rate_limiter: OrderRateLimiter::new(
                settings.max_orders_per_hour,
                settings.max_orders_per_day,
            ),
            event_tx,
            epoch,
            hold_duration_ms: settings.hold_duration_ms,
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to reservation event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<ReservationEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &ReservationStorage {
        &self.storage
    }

    /// Generate the next order code (crash-safe via redb)
    fn next_order_code(&self) -> ManagerResult<String> {
        let count = self.storage.next_order_count()?;
        let date_str = chrono::Utc::now().format("%Y%m%d").to_string();
        Ok(format!("ORD{}{}", date_str, 10000 + count))
    }

    // ========================================================================
    // create_order
    // ========================================================================

    /// Open a new order: hold the seats, quote the price, create the charge.
    pub async fn create_order(
        &self,
        req: CreateOrderRequest,
    ) -> ManagerResult<CreateOrderResponse> {
        validate_request(&req)?;

        let config = self
            .storage
            .get_event_config(&req.event_id)?
            .ok_or_else(|| ManagerError::EventNotFound(req.event_id.clone()))?;

        let now = now_millis();
        self.rate_limiter
            .check(&req.buyer_id, now)
            .map_err(|e| ManagerError::RateLimited(e.to_string()))?;

        // Pre-generate the order code BEFORE the main transaction:
        // redb does not allow nested write transactions.
        let order_code = self.next_order_code()?;

        // Global lock ordering: claim batches always walk seat ids sorted
        let mut seat_ids = req.seat_ids.clone();
        seat_ids.sort();

        // --- unit of work: validate and flip, no network I/O inside ---
        let snapshot = {
            let txn = self.storage.begin_write()?;

            if let Some(existing) =
                self.storage
                    .pending_order_for_buyer_txn(&txn, &req.event_id, &req.buyer_id)?
            {
                return Err(ManagerError::PendingOrderExists(existing));
            }

            let ledger = SeatLedger::new(&txn);
            let seats =
                ledger.lock_seats(&req.event_id, &order_code, &seat_ids, SeatStatus::Available)?;

            let mut tickets = Vec::with_capacity(seats.len());
            let mut subtotal = rust_decimal::Decimal::ZERO;
            for seat in &seats {
                let category_id = seat.category_id.clone().ok_or_else(|| {
                    ManagerError::Validation(format!(
                        "seat {} has no ticket category assigned",
                        seat.label
                    ))
                })?;
                let category = self
                    .storage
                    .get_category_txn(&txn, &category_id)?
                    .ok_or_else(|| {
                        ManagerError::Validation(format!("unknown ticket category: {category_id}"))
                    })?;
                let windows = self.storage.price_windows_txn(&txn, &category_id)?;
                let price = crate::pricing::resolve(&category, &windows, now);

                subtotal += money::to_decimal(price);
                tickets.push(TicketSnapshot {
                    ticket_id: snowflake_id(),
                    seat_id: seat.seat_id.clone(),
                    seat_label: seat.label.clone(),
                    category_id,
                    category_name: category.name,
                    price,
                    status: TicketStatus::Enabled,
                });
            }

            let subtotal = money::to_f64(subtotal);
            let tax = money::tax_amount(subtotal, config.tax_percent);
            let total_price = money::round2(subtotal + tax);

            let snapshot = OrderSnapshot {
                order_code: order_code.clone(),
                event_id: req.event_id.clone(),
                buyer_id: req.buyer_id.clone(),
                contact: req.contact.clone(),
                status: OrderStatus::Pending,
                subtotal,
                tax,
                total_price,
                tickets,
                charge: None,
                settlement: None,
                created_at: now,
                expires_at: now + self.hold_duration_ms,
            };
            self.storage.insert_new_order(&txn, &snapshot)?;

            txn.commit().map_err(StorageError::from)?;
            snapshot
        };

        self.rate_limiter.record(&req.buyer_id, now);
        self.broadcast_seats(
            &snapshot,
            ReservationEventType::OrderCreated,
            SeatStatus::InTransaction,
        );

        // --- outbound provider call, seat lock already released ---
        let provider = self.providers.get(&config.provider)?;
        let charge_req = ChargeRequest {
            order_code: order_code.clone(),
            gross_amount: snapshot.total_price,
            currency: config.currency.clone(),
            items: snapshot
                .tickets
                .iter()
                .map(|t| LineItem {
                    id: t.ticket_id.to_string(),
                    name: format!("{} - seat {}", t.category_name, t.seat_label),
                    price: t.price,
                    quantity: 1,
                })
                .collect(),
            customer: req.contact.clone(),
        };

        match provider.charge(&charge_req, &config.credentials).await {
            Ok(accessor) => {
                self.attach_charge(&order_code, &accessor)?;
                tracing::info!(
                    order_code = %order_code,
                    provider = %accessor.provider,
                    total = snapshot.total_price,
                    "Order created, awaiting payment"
                );
                Ok(CreateOrderResponse {
                    order_code,
                    accessor,
                    total_price: snapshot.total_price,
                    expires_at: snapshot.expires_at,
                })
            }
            Err(e) => {
                tracing::warn!(order_code = %order_code, error = %e, "Charge creation failed, rolling back order");
                self.rollback_order_creation(&snapshot)?;
                Err(ManagerError::Provider(e))
            }
        }
    }

    /// Persist the provider's charge response onto the pending order
    fn attach_charge(&self, order_code: &str, accessor: &PaymentAccessor) -> ManagerResult<()> {
        let txn = self.storage.begin_write()?;
        let Some(mut order) = self.storage.get_order_txn(&txn, order_code)? else {
            tracing::warn!(order_code = %order_code, "Order vanished before charge could be attached");
            return Ok(());
        };
        if order.status != OrderStatus::Pending {
            // Settled in the window between commit and charge response
            tracing::warn!(order_code = %order_code, status = ?order.status, "Order settled before charge could be attached");
            return Ok(());
        }
        order.charge = Some(ChargeRecord {
            provider: accessor.provider.clone(),
            token: accessor.token.clone(),
            redirect_url: accessor.redirect_url.clone(),
            provider_ref: accessor.provider_ref.clone(),
            raw: accessor.raw.clone(),
            created_at: now_millis(),
        });
        self.storage.update_order(&txn, &order)?;
        txn.commit()
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Compensate a failed charge: remove the order entirely and free the
    /// seats. Nothing of the attempt survives.
    fn rollback_order_creation(&self, snapshot: &OrderSnapshot) -> ManagerResult<()> {
        let mut seat_ids = snapshot.seat_ids();
        seat_ids.sort();

        let txn = self.storage.begin_write()?;
        let ledger = SeatLedger::new(&txn);
        ledger.release(&snapshot.event_id, &seat_ids)?;
        self.storage.remove_order(&txn, snapshot)?;
        txn.commit()
            .map_err(StorageError::from)?;

        self.broadcast_seats(
            snapshot,
            ReservationEventType::OrderCancelled,
            SeatStatus::Available,
        );
        Ok(())
    }

    // ========================================================================
    // settle
    // ========================================================================

    /// Drive an order to a terminal state. Idempotent: repeated calls and
    /// callbacks for already-terminal orders are logged no-ops.
    pub fn settle(
        &self,
        order_code: &str,
        outcome: OrderStatus,
        reason: SettleReason,
        provider_payload: Option<serde_json::Value>,
    ) -> ManagerResult<SettleOutcome> {
        if outcome == OrderStatus::Pending {
            tracing::debug!(order_code = %order_code, "Pending settlement callback acknowledged as no-op");
            return Ok(SettleOutcome::AlreadySettled);
        }

        let now = now_millis();
        let txn = self.storage.begin_write()?;

        let Some(mut order) = self.storage.get_order_txn(&txn, order_code)? else {
            return Err(ManagerError::OrderNotFound(order_code.to_string()));
        };
        if order.status.is_terminal() {
            tracing::info!(
                order_code = %order_code,
                status = ?order.status,
                requested = ?outcome,
                "Settlement is a no-op, order already terminal"
            );
            return Ok(SettleOutcome::AlreadySettled);
        }

        let mut seat_ids = order.seat_ids();
        seat_ids.sort();

        let ledger = SeatLedger::new(&txn);
        let seat_status = match outcome {
            OrderStatus::Completed => {
                ledger.commit_booked(&order.event_id, &seat_ids)?;
                SeatStatus::Booked
            }
            OrderStatus::Cancelled => {
                for ticket in &mut order.tickets {
                    ticket.status = TicketStatus::Deactivated;
                }
                ledger.release(&order.event_id, &seat_ids)?;
                SeatStatus::Available
            }
            OrderStatus::Pending => unreachable!("rejected above"),
        };

        order.status = outcome;
        order.settlement = Some(SettlementRecord {
            outcome,
            reason,
            provider_payload,
            settled_at: now,
        });
        self.storage.update_order(&txn, &order)?;
        self.storage.remove_pending_indexes(&txn, &order)?;
        self.storage.enqueue_archive(&txn, order_code, now)?;
        txn.commit()
            .map_err(StorageError::from)?;

        let event_type = match (outcome, reason) {
            (OrderStatus::Completed, _) => ReservationEventType::OrderCompleted,
            (_, SettleReason::Expired) => ReservationEventType::OrderExpired,
            _ => ReservationEventType::OrderCancelled,
        };
        tracing::info!(order_code = %order_code, outcome = ?outcome, reason = ?reason, "Order settled");

        self.broadcast_seats(&order, event_type, seat_status);
        if self
            .event_tx
            .send(ReservationEvent::OrderSettled {
                order_code: order_code.to_string(),
                status: outcome,
            })
            .is_err()
        {
            tracing::debug!("Event broadcast failed: no active receivers");
        }

        Ok(SettleOutcome::Applied)
    }

    // ========================================================================
    // provider callbacks
    // ========================================================================

    /// Verify and apply an asynchronous provider callback.
    ///
    /// Unknown orders and test notifications are acknowledged without side
    /// effects so providers never enter a retry storm; invalid signatures
    /// are rejected.
    pub fn apply_callback(
        &self,
        provider_name: &str,
        payload: CallbackPayload,
    ) -> ManagerResult<SettleOutcome> {
        let provider = self.providers.get(provider_name)?;

        let order_code = provider.extract_order_code(&payload)?;
        let Some(order) = self.storage.get_order(&order_code)? else {
            tracing::warn!(
                provider = provider_name,
                order_code = %order_code,
                "Callback for unknown order acknowledged as no-op"
            );
            return Ok(SettleOutcome::AlreadySettled);
        };

        let config = self
            .storage
            .get_event_config(&order.event_id)?
            .ok_or_else(|| ManagerError::EventNotFound(order.event_id.clone()))?;

        let verdict = provider.verify_callback(&payload, &config.credentials)?;

        if let Some(callback_id) = &verdict.callback_id
            && self.storage.is_callback_processed(callback_id)?
        {
            tracing::debug!(callback_id = %callback_id, "Duplicate callback acknowledged as no-op");
            return Ok(SettleOutcome::AlreadySettled);
        }

        let outcome = self.settle(
            &order_code,
            verdict.status,
            SettleReason::PaymentCallback,
            Some(payload.body),
        )?;

        if outcome == SettleOutcome::Applied
            && let Some(callback_id) = &verdict.callback_id
        {
            self.storage.mark_callback_processed(callback_id)?;
        }
        Ok(outcome)
    }

    // ========================================================================
    // cancel / queries / sweep
    // ========================================================================

    /// User-initiated bulk cancel of the caller's own pending orders.
    /// Per-order isolation: one failure never aborts the rest.
    pub fn cancel_pending(
        &self,
        event_id: &str,
        buyer_id: &str,
        order_codes: &[String],
    ) -> CancelReport {
        let mut report = CancelReport::default();
        for order_code in order_codes {
            let reason = match self.storage.get_order(order_code) {
                Ok(Some(order)) if order.buyer_id != buyer_id || order.event_id != event_id => {
                    Some("order does not belong to this buyer and event".to_string())
                }
                Ok(Some(order)) if order.status.is_terminal() => {
                    Some("order already settled".to_string())
                }
                Ok(Some(_)) => None,
                Ok(None) => Some("order not found".to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = reason {
                report.rejected.push(RejectedCancel {
                    order_code: order_code.clone(),
                    reason,
                });
                continue;
            }

            match self.settle(
                order_code,
                OrderStatus::Cancelled,
                SettleReason::BuyerCancelled,
                None,
            ) {
                Ok(SettleOutcome::Applied) => report.cancelled.push(order_code.clone()),
                Ok(SettleOutcome::AlreadySettled) => report.rejected.push(RejectedCancel {
                    order_code: order_code.clone(),
                    reason: "order already settled".to_string(),
                }),
                Err(e) => {
                    tracing::error!(order_code = %order_code, error = %e, "Cancel failed");
                    report.rejected.push(RejectedCancel {
                        order_code: order_code.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// A buyer's pending orders for an event (resume-payment support)
    pub fn pending_orders(
        &self,
        event_id: &str,
        buyer_id: &str,
    ) -> ManagerResult<Vec<PendingOrderView>> {
        let codes = self.storage.pending_orders_for_buyer(event_id, buyer_id)?;
        let mut views = Vec::with_capacity(codes.len());
        for code in codes {
            let Some(order) = self.storage.get_order(&code)? else {
                continue;
            };
            if order.status != OrderStatus::Pending {
                continue;
            }
            views.push(PendingOrderView {
                order_code: order.order_code.clone(),
                seats: order.tickets.iter().map(|t| t.seat_label.clone()).collect(),
                total_price: order.total_price,
                expires_at: order.expires_at,
                payment: order.charge.as_ref().map(|c| ResumePayment {
                    provider: c.provider.clone(),
                    token: c.token.clone(),
                    redirect_url: c.redirect_url.clone(),
                }),
            });
        }
        Ok(views)
    }

    /// Live seat map for an event
    pub fn seat_map(&self, event_id: &str) -> ManagerResult<Vec<Seat>> {
        let config = self
            .storage
            .get_event_config(event_id)?
            .ok_or_else(|| ManagerError::EventNotFound(event_id.to_string()))?;
        Ok(self.storage.seats_for_venue(&config.venue_id)?)
    }

    /// Release every pending order whose hold deadline has passed.
    ///
    /// Runs through the same settle path as explicit cancellation, one
    /// order at a time; a failing order is logged and skipped.
    pub fn sweep_expired(&self, now: i64) -> SweepReport {
        let codes = match self.storage.active_order_codes() {
            Ok(codes) => codes,
            Err(e) => {
                tracing::error!(error = %e, "Sweep scan failed");
                return SweepReport::default();
            }
        };

        let mut report = SweepReport {
            checked: codes.len(),
            ..Default::default()
        };
        for code in codes {
            let expired = match self.storage.get_order(&code) {
                Ok(Some(order)) => order.is_expired(now),
                Ok(None) => false,
                Err(e) => {
                    tracing::error!(order_code = %code, error = %e, "Sweep read failed");
                    report.failed += 1;
                    false
                }
            };
            if !expired {
                continue;
            }
            match self.settle(&code, OrderStatus::Cancelled, SettleReason::Expired, None) {
                Ok(SettleOutcome::Applied) => report.expired.push(code),
                Ok(SettleOutcome::AlreadySettled) => {}
                Err(e) => {
                    tracing::error!(order_code = %code, error = %e, "Sweep release failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    // ========================================================================
    // events
    // ========================================================================

    /// Broadcast + publish a seat availability change (after commit,
    /// never inside the transaction; failures are swallowed)
    fn broadcast_seats(
        &self,
        order: &OrderSnapshot,
        event_type: ReservationEventType,
        status: SeatStatus,
    ) {
        let payload = shared::SeatStatusChanged {
            event_type,
            event_id: order.event_id.clone(),
            order_code: order.order_code.clone(),
            seats: order
                .tickets
                .iter()
                .map(|t| SeatState {
                    id: t.seat_id.clone(),
                    status,
                    category_id: Some(t.category_id.clone()),
                })
                .collect(),
            timestamp: now_millis(),
        };

        if self
            .event_tx
            .send(ReservationEvent::SeatsChanged(payload.clone()))
            .is_err()
        {
            tracing::debug!("Event broadcast failed: no active receivers");
        }
        self.publisher.publish(&payload.topic(), &payload);
    }
}

/// Pre-lock request validation
fn validate_request(req: &CreateOrderRequest) -> ManagerResult<()> {
    let to_validation = |e: AppError| match e {
        AppError::Validation(msg) => ManagerError::Validation(msg),
        other => ManagerError::Validation(other.to_string()),
    };
    if req.event_id.trim().is_empty() {
        return Err(ManagerError::Validation("event_id must not be empty".to_string()));
    }
    if req.buyer_id.trim().is_empty() {
        return Err(ManagerError::Validation("buyer_id must not be empty".to_string()));
    }
    validate_seat_selection(&req.seat_ids).map_err(to_validation)?;
    validate_contact(&req.contact).map_err(to_validation)?;
    Ok(())
}
