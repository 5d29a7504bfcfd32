//! Provider Callback API Module
//!
//! Asynchronous payment notifications. Providers deliver at-least-once, so
//! the handler path is idempotent end to end.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Callback router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/callbacks/{provider}", post(handler::provider_callback))
}
