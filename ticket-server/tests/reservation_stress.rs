//! 预订并发压力测试
//!
//! 多个买家同时抢同一批座位，验证绝不超卖。

use std::sync::Arc;

use rand::Rng;
use shared::{BuyerContact, OrderStatus, SeatStatus, SettleReason};
use ticket_server::catalog::{EventConfig, Seat, TicketCategory};
use ticket_server::notify::NoopPublisher;
use ticket_server::payments::{
    MockProvider, PaymentEnvironment, ProviderCredentials, ProviderRegistry, Secret,
};
use ticket_server::reservations::manager::{CreateOrderRequest, ManagerError};
use ticket_server::{ReservationManager, ReservationSettings, ReservationStorage};

const EVENT: &str = "event:stadium-final";
const VENUE: &str = "venue:stadium";
const SEAT_COUNT: u32 = 12;
const BUYER_COUNT: usize = 40;

fn build_manager() -> Arc<ReservationManager> {
    let storage = ReservationStorage::open_in_memory().unwrap();

    let seats: Vec<Seat> = (1..=SEAT_COUNT)
        .map(|n| Seat {
            seat_id: format!("seat:s{n}"),
            venue_id: VENUE.to_string(),
            label: format!("S{n}"),
            row: (n - 1) / 4 + 1,
            column: (n - 1) % 4 + 1,
            category_id: Some("cat:standard".to_string()),
            status: SeatStatus::Available,
        })
        .collect();
    storage.put_seats(&seats).unwrap();

    storage
        .put_category(&TicketCategory {
            category_id: "cat:standard".to_string(),
            event_id: EVENT.to_string(),
            name: "Standard".to_string(),
            color: "#4a90d9".to_string(),
            base_price: 75000.0,
        })
        .unwrap();

    storage
        .put_event_config(&EventConfig {
            event_id: EVENT.to_string(),
            name: "Stadium Final".to_string(),
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

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(MockProvider::new()));

    Arc::new(ReservationManager::new(
        storage,
        registry,
        Arc::new(NoopPublisher),
        ReservationSettings {
            hold_duration_ms: 10 * 60 * 1000,
            max_orders_per_hour: 1000,
            max_orders_per_day: 1000,
        },
    ))
}

fn contact(n: usize) -> BuyerContact {
    BuyerContact {
        name: format!("Buyer {n}"),
        email: format!("buyer{n}@example.com"),
        phone: None,
    }
}

fn request(buyer: usize, seat_ids: Vec<String>) -> CreateOrderRequest {
    CreateOrderRequest {
        event_id: EVENT.to_string(),
        buyer_id: format!("buyer:{buyer}"),
        seat_ids,
        contact: contact(buyer),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn two_simultaneous_orders_for_the_same_seats_have_one_winner() {
    let manager = build_manager();

    let pair = vec!["seat:s1".to_string(), "seat:s2".to_string()];
    let a = {
        let manager = manager.clone();
        let pair = pair.clone();
        tokio::spawn(async move { manager.create_order(request(1, pair)).await })
    };
    let b = {
        let manager = manager.clone();
        let pair = pair.clone();
        tokio::spawn(async move { manager.create_order(request(2, pair)).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one order may claim the batch");

    let loser = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one racer must lose");
    assert!(matches!(loser, ManagerError::SeatConflict(_)));

    // The winning hold is visible to every reader
    for seat_id in &pair {
        let seat = manager.storage().get_seat(seat_id).unwrap().unwrap();
        assert_eq!(seat.status, SeatStatus::InTransaction);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_buyers_never_double_book_a_seat() {
    let manager = build_manager();

    let mut handles = Vec::with_capacity(BUYER_COUNT);
    for buyer in 0..BUYER_COUNT {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            // Each buyer goes for a random adjacent pair
            let first = rand::thread_rng().gen_range(1..SEAT_COUNT);
            let seats = vec![format!("seat:s{first}"), format!("seat:s{}", first + 1)];
            manager.create_order(request(buyer, seats)).await
        }));
    }

    let mut claimed: Vec<String> = Vec::new();
    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(response) => {
                let order = manager
                    .storage()
                    .get_order(&response.order_code)
                    .unwrap()
                    .unwrap();
                claimed.extend(order.seat_ids());
                winners.push(response.order_code);
            }
            Err(ManagerError::SeatConflict(_)) | Err(ManagerError::PendingOrderExists(_)) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    // No seat may be claimed by two successful orders
    let mut deduped = claimed.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), claimed.len(), "a seat was double-booked");

    // Ledger agrees with the orders: claimed seats are held, the rest free
    for n in 1..=SEAT_COUNT {
        let seat_id = format!("seat:s{n}");
        let seat = manager.storage().get_seat(&seat_id).unwrap().unwrap();
        if claimed.contains(&seat_id) {
            assert_eq!(seat.status, SeatStatus::InTransaction);
        } else {
            assert_eq!(seat.status, SeatStatus::Available);
        }
    }

    // Settle winners alternately; the ledger must end consistent
    for (i, code) in winners.iter().enumerate() {
        let outcome = if i % 2 == 0 {
            OrderStatus::Completed
        } else {
            OrderStatus::Cancelled
        };
        manager
            .settle(code, outcome, SettleReason::PaymentCallback, None)
            .unwrap();
    }

    for n in 1..=SEAT_COUNT {
        let seat_id = format!("seat:s{n}");
        let seat = manager.storage().get_seat(&seat_id).unwrap().unwrap();
        assert!(
            seat.status == SeatStatus::Booked || seat.status == SeatStatus::Available,
            "seat {seat_id} stuck in {:?}",
            seat.status
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn expired_holds_free_seats_for_the_next_wave() {
    let manager = build_manager();

    // First wave claims seats with an already-expired hold
    let short_hold = {
        let storage = manager.storage().clone();
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::new()));
        Arc::new(ReservationManager::new(
            storage,
            registry,
            Arc::new(NoopPublisher),
            ReservationSettings {
                hold_duration_ms: 1,
                max_orders_per_hour: 1000,
                max_orders_per_day: 1000,
            },
        ))
    };

    for buyer in 0..4 {
        let seats = vec![format!("seat:s{}", buyer * 2 + 1), format!("seat:s{}", buyer * 2 + 2)];
        short_hold
            .create_order(request(buyer, seats))
            .await
            .unwrap();
    }

    let report = short_hold.sweep_expired(shared::util::now_millis() + 1000);
    assert_eq!(report.expired.len(), 4);

    // Whole map is free again
    for n in 1..=SEAT_COUNT {
        let seat = manager
            .storage()
            .get_seat(&format!("seat:s{n}"))
            .unwrap()
            .unwrap();
        assert_eq!(seat.status, SeatStatus::Available);
    }
}
