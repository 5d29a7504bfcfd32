//! Health check endpoint

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use crate::utils::{AppResponse, ok};

/// Health router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<ServerState>) -> Json<AppResponse<serde_json::Value>> {
    ok(serde_json::json!({
        "status": "ok",
        // Clients compare the epoch to detect restarts and resync
        "epoch": state.manager.epoch(),
    }))
}
