//! Seat Ledger
//!
//! The authoritative record of seat state. Every operation runs inside an
//! open write transaction - redb's single writer is the serializing lock,
//! so a batch either commits whole or leaves no trace. Status changes
//! become visible to every reader at commit; availability checks never
//! observe a partial batch.

use redb::{ReadableTable, WriteTransaction};
use shared::SeatStatus;
use thiserror::Error;

use crate::catalog::Seat;

use super::storage::{SEAT_CLAIMS_TABLE, SEATS_TABLE, StorageError};

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Seat not found: {0}")]
    NotFound(String),

    /// At least one requested seat is no longer in the expected status;
    /// the whole batch fails.
    #[error("Seat no longer available: {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<redb::TableError> for LedgerError {
    fn from(err: redb::TableError) -> Self {
        LedgerError::Storage(StorageError::Table(err))
    }
}

impl From<redb::StorageError> for LedgerError {
    fn from(err: redb::StorageError) -> Self {
        LedgerError::Storage(StorageError::Storage(err))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(StorageError::Serialization(err))
    }
}

/// Seat ledger operations bound to one unit of work
pub struct SeatLedger<'a> {
    txn: &'a WriteTransaction,
}

impl<'a> SeatLedger<'a> {
    pub fn new(txn: &'a WriteTransaction) -> Self {
        Self { txn }
    }

    /// Claim a batch of seats for an order, all-or-nothing.
    ///
    /// Seat ids must arrive sorted (global lock ordering). Two passes:
    /// validate every seat first, then flip the batch to `InTransaction`
    /// and write the claim rows. Any failure aborts before a single write,
    /// and the enclosing transaction rolls back whatever was written.
    pub fn lock_seats(
        &self,
        event_id: &str,
        order_code: &str,
        seat_ids: &[String],
        expected: SeatStatus,
    ) -> Result<Vec<Seat>, LedgerError> {
        let mut seats_table = self.txn.open_table(SEATS_TABLE)?;
        let mut claims_table = self.txn.open_table(SEAT_CLAIMS_TABLE)?;

        // Validate pass
        let mut seats = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            let seat: Seat = match seats_table.get(seat_id.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(LedgerError::NotFound(seat_id.clone())),
            };
            if seat.status != expected {
                return Err(LedgerError::Conflict(seat.label.clone()));
            }
            if claims_table
                .get((event_id, seat_id.as_str()))?
                .is_some()
            {
                return Err(LedgerError::Conflict(seat.label.clone()));
            }
            seats.push(seat);
        }

        // Flip pass
        for seat in &mut seats {
            seat.status = SeatStatus::InTransaction;
            let value = serde_json::to_vec(seat)?;
            seats_table.insert(seat.seat_id.as_str(), value.as_slice())?;
            claims_table.insert((event_id, seat.seat_id.as_str()), order_code)?;
        }

        Ok(seats)
    }

    /// Finalize a settled purchase: seats become `Booked`, claims stay as
    /// the permanent seat-to-order reference.
    pub fn commit_booked(
        &self,
        _event_id: &str,
        seat_ids: &[String],
    ) -> Result<Vec<Seat>, LedgerError> {
        self.set_status(seat_ids, SeatStatus::Booked)
    }

    /// Return seats to the pool and drop their claims.
    ///
    /// `Booked` seats only pass through here from the explicit
    /// cancellation flow; nothing else may free them.
    pub fn release(&self, event_id: &str, seat_ids: &[String]) -> Result<Vec<Seat>, LedgerError> {
        let seats = self.set_status(seat_ids, SeatStatus::Available)?;
        let mut claims_table = self.txn.open_table(SEAT_CLAIMS_TABLE)?;
        for seat_id in seat_ids {
            claims_table.remove((event_id, seat_id.as_str()))?;
        }
        Ok(seats)
    }

    fn set_status(
        &self,
        seat_ids: &[String],
        status: SeatStatus,
    ) -> Result<Vec<Seat>, LedgerError> {
        let mut seats_table = self.txn.open_table(SEATS_TABLE)?;
        let mut seats = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            let mut seat: Seat = match seats_table.get(seat_id.as_str())? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(LedgerError::NotFound(seat_id.clone())),
            };
            seat.status = status;
            let value = serde_json::to_vec(&seat)?;
            seats_table.insert(seat.seat_id.as_str(), value.as_slice())?;
            seats.push(seat);
        }
        Ok(seats)
    }
}
