//! Catalog - venue layouts, ticket categories, price windows, event config
//!
//! Setup data the reservation core reads. Records are seeded at
//! venue/layout setup time; the admin UI that edits them lives outside
//! this service.

mod models;

pub use models::*;
