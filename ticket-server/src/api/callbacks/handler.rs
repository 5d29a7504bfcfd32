//! Provider Callback Handler

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};

use crate::core::ServerState;
use crate::payments::CallbackPayload;
use crate::utils::{AppResponse, AppResult, ok_with_message};

/// Receive an asynchronous payment notification.
///
/// Signature/shape is verified before settlement; unknown orders and
/// duplicate deliveries are acknowledged without side effects so the
/// provider stops retrying.
pub async fn provider_callback(
    State(state): State<ServerState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<AppResponse<serde_json::Value>>> {
    let callback_token = headers
        .get("x-callback-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let payload = CallbackPayload {
        body,
        callback_token,
    };

    state.manager.apply_callback(&provider, payload)?;
    Ok(ok_with_message(
        serde_json::json!({ "received": true }),
        "Callback processed",
    ))
}
