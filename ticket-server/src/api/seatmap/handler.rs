//! Seat Map Handler

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::SeatStatus;

use crate::catalog::Seat;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// One seat as rendered by seat-map clients
#[derive(Debug, Serialize)]
pub struct SeatView {
    pub id: String,
    pub label: String,
    pub row: u32,
    pub column: u32,
    pub status: SeatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl From<Seat> for SeatView {
    fn from(seat: Seat) -> Self {
        Self {
            id: seat.seat_id,
            label: seat.label,
            row: seat.row,
            column: seat.column,
            status: seat.status,
            category_id: seat.category_id,
        }
    }
}

/// Live seat availability for an event
pub async fn seat_map(
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<SeatView>>>> {
    let seats = state.manager.seat_map(&event_id)?;
    Ok(ok(seats.into_iter().map(SeatView::from).collect()))
}
