//! Reservation domain types
//!
//! Status vocabularies, order snapshots and wire events for the seat
//! reservation lifecycle.

mod event;
mod snapshot;
mod types;

pub use event::*;
pub use snapshot::*;
pub use types::*;
