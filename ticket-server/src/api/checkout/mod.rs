//! Checkout API Module
//!
//! Order creation, resume-payment listing and user-initiated cancellation.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Checkout router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", post(handler::create_order))
        .route("/orders/pending", get(handler::pending_orders))
        .route("/orders/cancel", post(handler::cancel_orders))
}
