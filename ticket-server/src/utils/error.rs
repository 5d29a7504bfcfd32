//! Unified Error Handling
//!
//! Application-wide error type and the response envelope every API handler
//! returns.
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 业务逻辑错误 | E0004 座位冲突 |
//! | E8xxx | 支付网关错误 | E8001 网关不可用 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::reservations::manager::ManagerError;

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Seat already held/booked, pending order already open, etc.
    /// Retryable from the buyer's point of view.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    // ========== Payment Gateway Errors ==========
    /// Provider detail is logged server-side and suppressed from the client.
    #[error("Payment provider error: {0}")]
    Provider(String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        AppError::RateLimited(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        AppError::Provider(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409) - "seat no longer available", surfaced verbatim
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Rate limited (429) - user-visible, not retried automatically
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "E0007", msg.clone()),

            // Payment gateway (502) - detail never reaches the buyer
            AppError::Provider(msg) => {
                error!(target: "payments", error = %msg, "Payment provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    "E8001",
                    "Payment provider error".to_string(),
                )
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        use crate::payments::ProviderError;

        match err {
            ManagerError::SeatConflict(msg) => AppError::Conflict(msg),
            ManagerError::PendingOrderExists(code) => AppError::Conflict(format!(
                "A pending order already exists for this event: {}",
                code
            )),
            ManagerError::SeatNotFound(msg) => AppError::NotFound(format!("Seat {}", msg)),
            ManagerError::OrderNotFound(msg) => AppError::NotFound(format!("Order {}", msg)),
            ManagerError::EventNotFound(msg) => AppError::NotFound(format!("Event {}", msg)),
            ManagerError::Validation(msg) => AppError::Validation(msg),
            ManagerError::RateLimited(msg) => AppError::RateLimited(msg),
            // Callback rejections are the caller's fault, not the gateway's
            ManagerError::Provider(
                e @ (ProviderError::InvalidSignature
                | ProviderError::MalformedPayload(_)
                | ProviderError::UnknownProvider(_)),
            ) => AppError::Validation(e.to_string()),
            ManagerError::Provider(e) => AppError::Provider(e.to_string()),
            ManagerError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}
