use super::*;
use std::sync::Arc;

use shared::util::now_millis;
use shared::{BuyerContact, OrderStatus, SeatStatus, SettleReason, TicketStatus};

use crate::catalog::{EventConfig, Seat, TicketCategory, TimeboundPrice};
use crate::notify::NoopPublisher;
use crate::payments::{
    MockProvider, PaymentEnvironment, ProviderCredentials, ProviderRegistry, Secret,
};
use crate::reservations::storage::ReservationStorage;

mod test_callbacks;
mod test_settle;

const EVENT: &str = "event:rock-night";
const VENUE: &str = "venue:main-hall";
const BUYER: &str = "buyer:alice";

struct TestHarness {
    manager: ReservationManager,
    provider: Arc<MockProvider>,
}

fn create_test_manager() -> TestHarness {
    create_test_manager_with(ReservationSettings {
        hold_duration_ms: 10 * 60 * 1000,
        max_orders_per_hour: 100,
        max_orders_per_day: 100,
    })
}

fn create_test_manager_with(settings: ReservationSettings) -> TestHarness {
    let storage = ReservationStorage::open_in_memory().unwrap();
    seed_catalog(&storage);

    let provider = Arc::new(MockProvider::new());
    let mut registry = ProviderRegistry::new();
    registry.register(provider.clone());

    let manager = ReservationManager::new(storage, registry, Arc::new(NoopPublisher), settings);
    TestHarness { manager, provider }
}

fn seed_catalog(storage: &ReservationStorage) {
    storage
        .put_seats(&[
            seat("seat:a1", "A1", 1, 1, Some("cat:standard")),
            seat("seat:a2", "A2", 1, 2, Some("cat:standard")),
            seat("seat:a3", "A3", 1, 3, Some("cat:standard")),
            seat("seat:b1", "B1", 2, 1, Some("cat:vip")),
            seat("seat:c1", "C1", 3, 1, None),
        ])
        .unwrap();

    storage
        .put_category(&TicketCategory {
            category_id: "cat:standard".to_string(),
            event_id: EVENT.to_string(),
            name: "Standard".to_string(),
            color: "#4a90d9".to_string(),
            base_price: 50000.0,
        })
        .unwrap();
    storage
        .put_category(&TicketCategory {
            category_id: "cat:vip".to_string(),
            event_id: EVENT.to_string(),
            name: "VIP".to_string(),
            color: "#d4af37".to_string(),
            base_price: 200000.0,
        })
        .unwrap();

    // Early-bird window currently active for VIP
    let now = now_millis();
    storage
        .put_price_windows(
            "cat:vip",
            &[TimeboundPrice {
                price_id: "price:vip-early".to_string(),
                category_id: "cat:vip".to_string(),
                starts_at: now - 24 * 60 * 60 * 1000,
                ends_at: now + 24 * 60 * 60 * 1000,
                price: 100000.0,
            }],
        )
        .unwrap();

    storage
        .put_event_config(&EventConfig {
            event_id: EVENT.to_string(),
            name: "Rock Night".to_string(),
            venue_id: VENUE.to_string(),
            currency: "IDR".to_string(),
            tax_percent: 10.0,
            provider: "mock".to_string(),
            credentials: ProviderCredentials {
                environment: PaymentEnvironment::Sandbox,
                server_key: Secret::new("test-server-key"),
                callback_token: Secret::new("test-callback-token"),
            },
        })
        .unwrap();
}

fn seat(id: &str, label: &str, row: u32, column: u32, category: Option<&str>) -> Seat {
    Seat {
        seat_id: id.to_string(),
        venue_id: VENUE.to_string(),
        label: label.to_string(),
        row,
        column,
        category_id: category.map(str::to_string),
        status: SeatStatus::Available,
    }
}

fn contact() -> BuyerContact {
    BuyerContact {
        name: "Dewi Lestari".to_string(),
        email: "dewi@example.com".to_string(),
        phone: Some("+62811000111".to_string()),
    }
}

fn order_request(buyer: &str, seat_ids: &[&str]) -> CreateOrderRequest {
    CreateOrderRequest {
        event_id: EVENT.to_string(),
        buyer_id: buyer.to_string(),
        seat_ids: seat_ids.iter().map(|s| s.to_string()).collect(),
        contact: contact(),
    }
}

fn seat_status(manager: &ReservationManager, seat_id: &str) -> SeatStatus {
    manager
        .storage()
        .get_seat(seat_id)
        .unwrap()
        .expect("seat must exist")
        .status
}

/// Mock callback body for the given order
fn callback_body(order_code: &str, status: &str, callback_id: &str) -> crate::payments::CallbackPayload {
    crate::payments::CallbackPayload {
        body: serde_json::json!({
            "order_code": order_code,
            "status": status,
            "callback_id": callback_id,
        }),
        callback_token: None,
    }
}
