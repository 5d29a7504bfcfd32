use thiserror::Error;

use crate::payments::ProviderError;
use crate::reservations::ledger::LedgerError;
use crate::reservations::storage::StorageError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Seat already held/booked - retryable from the buyer's side
    #[error("Seat no longer available: {0}")]
    SeatConflict(String),

    #[error("Seat not found: {0}")]
    SeatNotFound(String),

    #[error("Pending order already exists: {0}")]
    PendingOrderExists(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Payment provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<LedgerError> for ManagerError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => ManagerError::SeatNotFound(id),
            LedgerError::Conflict(label) => ManagerError::SeatConflict(label),
            LedgerError::Storage(e) => ManagerError::Storage(e),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
