//! Checkout API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::BuyerContact;

use crate::core::ServerState;
use crate::reservations::manager::{
    CancelReport, CreateOrderRequest, CreateOrderResponse, PendingOrderView,
};
use crate::utils::{AppResponse, AppResult, ok};

/// Create order payload
#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub event_id: String,
    pub buyer_id: String,
    pub seat_ids: Vec<String>,
    pub contact: BuyerContact,
}

/// Open a new order and return the payment accessor
pub async fn create_order(
    State(state): State<ServerState>,
    Json(body): Json<CreateOrderBody>,
) -> AppResult<Json<AppResponse<CreateOrderResponse>>> {
    let response = state
        .manager
        .create_order(CreateOrderRequest {
            event_id: body.event_id,
            buyer_id: body.buyer_id,
            seat_ids: body.seat_ids,
            contact: body.contact,
        })
        .await?;
    Ok(ok(response))
}

/// Query params for the pending-orders listing
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub event_id: String,
    pub buyer_id: String,
}

/// List the buyer's pending orders (resume-payment support)
pub async fn pending_orders(
    State(state): State<ServerState>,
    Query(query): Query<PendingQuery>,
) -> AppResult<Json<AppResponse<Vec<PendingOrderView>>>> {
    let views = state
        .manager
        .pending_orders(&query.event_id, &query.buyer_id)?;
    Ok(ok(views))
}

/// Bulk cancel payload
#[derive(Debug, Deserialize)]
pub struct CancelOrdersBody {
    pub event_id: String,
    pub buyer_id: String,
    pub order_codes: Vec<String>,
}

/// Cancel the buyer's own pending orders
pub async fn cancel_orders(
    State(state): State<ServerState>,
    Json(body): Json<CancelOrdersBody>,
) -> AppResult<Json<AppResponse<CancelReport>>> {
    let report = state
        .manager
        .cancel_pending(&body.event_id, &body.buyer_id, &body.order_codes);
    Ok(ok(report))
}
