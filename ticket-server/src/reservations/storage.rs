//! redb-based storage for the reservation core
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `seats` | `seat_id` | `Seat` | Seat ledger rows (single source of truth) |
//! | `seat_claims` | `(event_id, seat_id)` | `order_code` | One live claim per seat × event |
//! | `ticket_categories` | `category_id` | `TicketCategory` | Category catalog |
//! | `price_windows` | `(category_id, price_id)` | `TimeboundPrice` | Timebound prices |
//! | `event_config` | `event_id` | `EventConfig` | Per-event selling/provider config |
//! | `orders` | `order_code` | `OrderSnapshot` | Live orders |
//! | `active_orders` | `order_code` | `()` | Pending order index (sweeper scan) |
//! | `buyer_orders` | `(event_id, buyer_id, order_code)` | `()` | Pending orders per buyer |
//! | `archived_orders` | `order_code` | `OrderSnapshot` | Terminal orders, moved off the hot path |
//! | `pending_archive` | `order_code` | `PendingArchive` | Archive queue (crash-safe) |
//! | `processed_callbacks` | `callback_id` | `()` | Provider-callback idempotency audit |
//! | `sequence_counter` | key | `u64` | Order-code counter |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`; the database file is always
//! in a consistent state, so a crash mid-checkout leaves either no order
//! or a recoverable `PENDING` order for the sweeper. Values are
//! JSON-serialized records.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use shared::OrderSnapshot;

use crate::catalog::{EventConfig, Seat, TicketCategory, TimeboundPrice};
use crate::pricing;

/// Seat ledger rows: key = seat_id, value = JSON-serialized Seat
pub(crate) const SEATS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("seats");

/// Live seat claims: key = (event_id, seat_id), value = order_code
pub(crate) const SEAT_CLAIMS_TABLE: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("seat_claims");

/// Ticket categories: key = category_id, value = JSON-serialized TicketCategory
const CATEGORIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("ticket_categories");

/// Timebound prices: key = (category_id, price_id), value = JSON-serialized TimeboundPrice
const PRICE_WINDOWS_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("price_windows");

/// Event selling config: key = event_id, value = JSON-serialized EventConfig
const EVENT_CONFIG_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("event_config");

/// Live orders: key = order_code, value = JSON-serialized OrderSnapshot
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Pending order index: key = order_code, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Pending orders per buyer: key = (event_id, buyer_id, order_code)
const BUYER_ORDERS_TABLE: TableDefinition<(&str, &str, &str), ()> =
    TableDefinition::new("buyer_orders");

/// Terminal orders moved off the hot tables
const ARCHIVED_ORDERS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("archived_orders");

/// Archive queue: key = order_code, value = JSON-serialized PendingArchive
const PENDING_ARCHIVE_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("pending_archive");

/// Processed provider callbacks: key = callback_id, value = empty
const PROCESSED_CALLBACKS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_callbacks");

/// Counters: key = "order_count", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const ORDER_COUNT_KEY: &str = "order_count";

/// Archive queue entry
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PendingArchive {
    pub order_code: String,
    pub created_at: i64,
    pub retry_count: u32,
    pub last_error: Option<String>,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid price windows: {0}")]
    InvalidPriceWindows(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Reservation storage backed by redb
#[derive(Clone)]
pub struct ReservationStorage {
    db: Arc<Database>,
}

impl ReservationStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (tests, ephemeral dev runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Create all tables so later read transactions never race table creation
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(SEATS_TABLE)?;
            let _ = write_txn.open_table(SEAT_CLAIMS_TABLE)?;
            let _ = write_txn.open_table(CATEGORIES_TABLE)?;
            let _ = write_txn.open_table(PRICE_WINDOWS_TABLE)?;
            let _ = write_txn.open_table(EVENT_CONFIG_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(BUYER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(ARCHIVED_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PENDING_ARCHIVE_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_CALLBACKS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(ORDER_COUNT_KEY)?.is_none() {
                seq_table.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction (the unit of work)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Counter (for order codes) ==========

    /// Get and increment the order count atomically (crash-safe).
    /// Returns the NEW count after increment.
    pub fn next_order_count(&self) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(ORDER_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(ORDER_COUNT_KEY, next)?;
        drop(table);
        txn.commit()?;
        Ok(next)
    }

    // ========== Catalog: seats ==========

    /// Upsert a batch of seats (layout seeding)
    pub fn put_seats(&self, seats: &[Seat]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SEATS_TABLE)?;
            for seat in seats {
                let value = serde_json::to_vec(seat)?;
                table.insert(seat.seat_id.as_str(), value.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_seat(&self, seat_id: &str) -> StorageResult<Option<Seat>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEATS_TABLE)?;
        match table.get(seat_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All seats of a venue, in map order (row, then column)
    pub fn seats_for_venue(&self, venue_id: &str) -> StorageResult<Vec<Seat>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEATS_TABLE)?;

        let mut seats = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let seat: Seat = serde_json::from_slice(value.value())?;
            if seat.venue_id == venue_id {
                seats.push(seat);
            }
        }
        seats.sort_by_key(|s| (s.row, s.column));
        Ok(seats)
    }

    // ========== Catalog: categories and price windows ==========

    pub fn put_category(&self, category: &TicketCategory) -> StorageResult<()> {
        crate::money::validate_price(category.base_price, "base_price")
            .map_err(StorageError::InvalidPrice)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CATEGORIES_TABLE)?;
            let value = serde_json::to_vec(category)?;
            table.insert(category.category_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub(crate) fn get_category_txn(
        &self,
        txn: &WriteTransaction,
        category_id: &str,
    ) -> StorageResult<Option<TicketCategory>> {
        let table = txn.open_table(CATEGORIES_TABLE)?;
        match table.get(category_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Replace a category's price windows. The non-overlap invariant and
    /// the price range are enforced here, before anything is persisted.
    pub fn put_price_windows(
        &self,
        category_id: &str,
        windows: &[TimeboundPrice],
    ) -> StorageResult<()> {
        pricing::validate_windows(category_id, windows)
            .map_err(|e| StorageError::InvalidPriceWindows(e.to_string()))?;
        for window in windows {
            crate::money::validate_price(window.price, "price")
                .map_err(StorageError::InvalidPrice)?;
        }

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRICE_WINDOWS_TABLE)?;
            let stale: Vec<String> = table
                .iter()?
                .filter_map(|r| r.ok())
                .filter(|(k, _)| k.value().0 == category_id)
                .map(|(k, _)| k.value().1.to_string())
                .collect();
            for price_id in stale {
                table.remove((category_id, price_id.as_str()))?;
            }
            for window in windows {
                let value = serde_json::to_vec(window)?;
                table.insert(
                    (category_id, window.price_id.as_str()),
                    value.as_slice(),
                )?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    pub(crate) fn price_windows_txn(
        &self,
        txn: &WriteTransaction,
        category_id: &str,
    ) -> StorageResult<Vec<TimeboundPrice>> {
        let table = txn.open_table(PRICE_WINDOWS_TABLE)?;
        let mut windows = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            if key.value().0 == category_id {
                windows.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(windows)
    }

    // ========== Catalog: event config ==========

    pub fn put_event_config(&self, config: &EventConfig) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(EVENT_CONFIG_TABLE)?;
            let value = serde_json::to_vec(config)?;
            table.insert(config.event_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_event_config(&self, event_id: &str) -> StorageResult<Option<EventConfig>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENT_CONFIG_TABLE)?;
        match table.get(event_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Orders ==========

    /// Persist a freshly created pending order and its indexes
    pub fn insert_new_order(
        &self,
        txn: &WriteTransaction,
        order: &OrderSnapshot,
    ) -> StorageResult<()> {
        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            orders.insert(order.order_code.as_str(), value.as_slice())?;
        }
        {
            let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            active.insert(order.order_code.as_str(), ())?;
        }
        {
            let mut buyer_idx = txn.open_table(BUYER_ORDERS_TABLE)?;
            buyer_idx.insert(
                (
                    order.event_id.as_str(),
                    order.buyer_id.as_str(),
                    order.order_code.as_str(),
                ),
                (),
            )?;
        }
        Ok(())
    }

    /// Overwrite an order snapshot (status/tickets/charge updates)
    pub fn update_order(&self, txn: &WriteTransaction, order: &OrderSnapshot) -> StorageResult<()> {
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        orders.insert(order.order_code.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Drop an order and every index entry (charge-failure rollback)
    pub fn remove_order(&self, txn: &WriteTransaction, order: &OrderSnapshot) -> StorageResult<()> {
        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            orders.remove(order.order_code.as_str())?;
        }
        self.remove_pending_indexes(txn, order)
    }

    /// Remove the pending indexes once an order settles (snapshot stays)
    pub fn remove_pending_indexes(
        &self,
        txn: &WriteTransaction,
        order: &OrderSnapshot,
    ) -> StorageResult<()> {
        {
            let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            active.remove(order.order_code.as_str())?;
        }
        {
            let mut buyer_idx = txn.open_table(BUYER_ORDERS_TABLE)?;
            buyer_idx.remove((
                order.event_id.as_str(),
                order.buyer_id.as_str(),
                order.order_code.as_str(),
            ))?;
        }
        Ok(())
    }

    /// Live order lookup, falling back to the archive for late callers
    pub fn get_order(&self, order_code: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        {
            let table = read_txn.open_table(ORDERS_TABLE)?;
            if let Some(value) = table.get(order_code)? {
                return Ok(Some(serde_json::from_slice(value.value())?));
            }
        }
        let archived = read_txn.open_table(ARCHIVED_ORDERS_TABLE)?;
        match archived.get(order_code)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Order lookup inside a write transaction (live first, then archive)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_code: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        {
            let table = txn.open_table(ORDERS_TABLE)?;
            if let Some(value) = table.get(order_code)? {
                return Ok(Some(serde_json::from_slice(value.value())?));
            }
        }
        let archived = txn.open_table(ARCHIVED_ORDERS_TABLE)?;
        match archived.get(order_code)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Any pending order for (event, buyer) - enforced before a new hold
    pub fn pending_order_for_buyer_txn(
        &self,
        txn: &WriteTransaction,
        event_id: &str,
        buyer_id: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(BUYER_ORDERS_TABLE)?;
        for result in table.iter()? {
            let (key, _) = result?;
            let (event, buyer, order_code) = key.value();
            if event == event_id && buyer == buyer_id {
                return Ok(Some(order_code.to_string()));
            }
        }
        Ok(None)
    }

    /// Pending order codes for (event, buyer) - resume-payment listing
    pub fn pending_orders_for_buyer(
        &self,
        event_id: &str,
        buyer_id: &str,
    ) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BUYER_ORDERS_TABLE)?;
        let mut codes = Vec::new();
        for result in table.iter()? {
            let (key, _) = result?;
            let (event, buyer, order_code) = key.value();
            if event == event_id && buyer == buyer_id {
                codes.push(order_code.to_string());
            }
        }
        Ok(codes)
    }

    /// All pending order codes (sweeper scan)
    pub fn active_order_codes(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let mut codes = Vec::new();
        for result in table.iter()? {
            let (key, _) = result?;
            codes.push(key.value().to_string());
        }
        Ok(codes)
    }

    // ========== Callback Idempotency ==========

    pub fn is_callback_processed(&self, callback_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_CALLBACKS_TABLE)?;
        Ok(table.get(callback_id)?.is_some())
    }

    pub fn mark_callback_processed(&self, callback_id: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PROCESSED_CALLBACKS_TABLE)?;
            table.insert(callback_id, ())?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Archive Queue ==========

    /// Queue a settled order for archiving (inside the settlement txn)
    pub fn enqueue_archive(
        &self,
        txn: &WriteTransaction,
        order_code: &str,
        now: i64,
    ) -> StorageResult<()> {
        let entry = PendingArchive {
            order_code: order_code.to_string(),
            created_at: now,
            retry_count: 0,
            last_error: None,
        };
        let mut table = txn.open_table(PENDING_ARCHIVE_TABLE)?;
        let value = serde_json::to_vec(&entry)?;
        table.insert(order_code, value.as_slice())?;
        Ok(())
    }

    pub fn get_pending_archives(&self) -> StorageResult<Vec<PendingArchive>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_ARCHIVE_TABLE)?;
        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok(entries)
    }

    /// Record a failed archive attempt
    pub fn bump_archive_retry(&self, order_code: &str, error: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PENDING_ARCHIVE_TABLE)?;
            let entry = match table.get(order_code)? {
                Some(value) => {
                    let mut entry: PendingArchive = serde_json::from_slice(value.value())?;
                    entry.retry_count += 1;
                    entry.last_error = Some(error.to_string());
                    entry
                }
                None => return Ok(()),
            };
            let value = serde_json::to_vec(&entry)?;
            table.insert(order_code, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Drop a queue entry without archiving (give-up path)
    pub fn remove_pending_archive(&self, order_code: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PENDING_ARCHIVE_TABLE)?;
            table.remove(order_code)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Move a terminal order from the live tables into the archive.
    ///
    /// Returns false when there is nothing to move (already archived).
    pub fn archive_order(&self, order_code: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let moved = {
            let snapshot = {
                let orders = txn.open_table(ORDERS_TABLE)?;
                match orders.get(order_code)? {
                    Some(value) => Some(value.value().to_vec()),
                    None => None,
                }
            };
            match snapshot {
                Some(bytes) => {
                    {
                        let mut archived = txn.open_table(ARCHIVED_ORDERS_TABLE)?;
                        archived.insert(order_code, bytes.as_slice())?;
                    }
                    {
                        let mut orders = txn.open_table(ORDERS_TABLE)?;
                        orders.remove(order_code)?;
                    }
                    {
                        let mut queue = txn.open_table(PENDING_ARCHIVE_TABLE)?;
                        queue.remove(order_code)?;
                    }
                    true
                }
                None => {
                    let mut queue = txn.open_table(PENDING_ARCHIVE_TABLE)?;
                    queue.remove(order_code)?;
                    false
                }
            }
        };
        txn.commit()?;
        Ok(moved)
    }

    /// Archived order lookup (reconciliation/reporting)
    pub fn archived_order(&self, order_code: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ARCHIVED_ORDERS_TABLE)?;
        match table.get(order_code)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::SeatStatus;

    fn seat(id: &str, row: u32, column: u32) -> Seat {
        Seat {
            seat_id: id.to_string(),
            venue_id: "venue:main-hall".to_string(),
            label: format!("R{row}C{column}"),
            row,
            column,
            category_id: Some("cat:standard".to_string()),
            status: SeatStatus::Available,
        }
    }

    #[test]
    fn order_counter_increments_monotonically() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        assert_eq!(storage.next_order_count().unwrap(), 1);
        assert_eq!(storage.next_order_count().unwrap(), 2);
        assert_eq!(storage.next_order_count().unwrap(), 3);
    }

    #[test]
    fn seats_round_trip_in_map_order() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        storage
            .put_seats(&[seat("seat:b2", 2, 2), seat("seat:a1", 1, 1), seat("seat:a2", 1, 2)])
            .unwrap();

        let seats = storage.seats_for_venue("venue:main-hall").unwrap();
        let labels: Vec<&str> = seats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["R1C1", "R1C2", "R2C2"]);
        assert!(storage.get_seat("seat:a1").unwrap().is_some());
        assert!(storage.get_seat("seat:zz").unwrap().is_none());
    }

    #[test]
    fn price_window_overlap_is_rejected_before_persisting() {
        let storage = ReservationStorage::open_in_memory().unwrap();
        let overlapping = vec![
            TimeboundPrice {
                price_id: "p1".to_string(),
                category_id: "cat:standard".to_string(),
                starts_at: 0,
                ends_at: 100,
                price: 50000.0,
            },
            TimeboundPrice {
                price_id: "p2".to_string(),
                category_id: "cat:standard".to_string(),
                starts_at: 100,
                ends_at: 200,
                price: 60000.0,
            },
        ];
        assert!(matches!(
            storage.put_price_windows("cat:standard", &overlapping),
            Err(StorageError::InvalidPriceWindows(_))
        ));
    }

    #[test]
    fn out_of_range_prices_are_rejected_before_persisting() {
        let storage = ReservationStorage::open_in_memory().unwrap();

        let category = TicketCategory {
            category_id: "cat:standard".to_string(),
            event_id: "event:rock-night".to_string(),
            name: "Standard".to_string(),
            color: "#4a90d9".to_string(),
            base_price: -1.0,
        };
        assert!(matches!(
            storage.put_category(&category),
            Err(StorageError::InvalidPrice(_))
        ));

        let window = TimeboundPrice {
            price_id: "p1".to_string(),
            category_id: "cat:standard".to_string(),
            starts_at: 0,
            ends_at: 100,
            price: f64::NAN,
        };
        assert!(matches!(
            storage.put_price_windows("cat:standard", &[window]),
            Err(StorageError::InvalidPrice(_))
        ));
    }

    #[test]
    fn storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.redb");

        {
            let storage = ReservationStorage::open(&path).unwrap();
            storage.put_seats(&[seat("seat:a1", 1, 1)]).unwrap();
            assert_eq!(storage.next_order_count().unwrap(), 1);
        }

        let storage = ReservationStorage::open(&path).unwrap();
        assert!(storage.get_seat("seat:a1").unwrap().is_some());
        // Counter continues where it left off
        assert_eq!(storage.next_order_count().unwrap(), 2);
    }
}
