//! Reservation core - storage, seat ledger, state machine, workers
//!
//! # Structure
//!
//! - [`storage`] - redb-backed persistence (the unit of work)
//! - [`ledger`] - seat ledger operations inside one transaction
//! - [`manager`] - the hold→pay→settle state machine
//! - [`rate_limit`] - pre-lock admission control
//! - [`sweeper`] - periodic expired-hold reclamation
//! - [`archive_worker`] - moves terminal orders off the hot tables

pub mod archive_worker;
pub mod ledger;
pub mod manager;
pub mod rate_limit;
pub mod storage;
pub mod sweeper;

pub use archive_worker::ArchiveWorker;
pub use ledger::{LedgerError, SeatLedger};
pub use manager::{ManagerError, ManagerResult, ReservationManager, ReservationSettings};
pub use rate_limit::OrderRateLimiter;
pub use storage::{ReservationStorage, StorageError};
pub use sweeper::ExpirySweeper;
