//! Seat Map API Module
//!
//! Read-only live availability for seat-map clients. All mutations go
//! through the reservation manager.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Seat map router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/seatmap/{event_id}", get(handler::seat_map))
}
