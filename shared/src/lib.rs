//! Shared domain types for the Tribune ticketing platform
//!
//! This crate holds the types that cross process boundaries: seat and order
//! status vocabularies, order snapshots, and the wire events consumed by
//! live seat-map clients. It deliberately contains no I/O.

pub mod reservation;
pub mod util;

// Re-export 公共类型
pub use reservation::{
    BuyerContact, ChargeRecord, OrderSnapshot, OrderStatus, ReservationEvent,
    ReservationEventType, SeatState, SeatStatus, SeatStatusChanged, SettleReason,
    SettlementRecord, TicketSnapshot, TicketStatus,
};
