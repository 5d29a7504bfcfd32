//! Pricing - timebound price window resolution
//!
//! Pure functions only: resolution never touches ledger state, so quotes
//! can be computed freely.

mod resolver;

pub use resolver::*;
