use super::*;

async fn open_order(h: &TestHarness, buyer: &str, seats: &[&str]) -> String {
    h.manager
        .create_order(order_request(buyer, seats))
        .await
        .unwrap()
        .order_code
}

#[tokio::test]
async fn test_settle_completed_books_the_seats() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1", "seat:a2"]).await;

    let outcome = h
        .manager
        .settle(&code, OrderStatus::Completed, SettleReason::PaymentCallback, None)
        .unwrap();
    assert_eq!(outcome, SettleOutcome::Applied);

    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.tickets.iter().all(|t| t.status == TicketStatus::Enabled));
    assert_eq!(order.settlement.unwrap().reason, SettleReason::PaymentCallback);

    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Booked);
    assert_eq!(seat_status(&h.manager, "seat:a2"), SeatStatus::Booked);

    // Settled orders leave the pending indexes
    assert!(h.manager.pending_orders(EVENT, BUYER).unwrap().is_empty());
}

#[tokio::test]
async fn test_settlement_is_idempotent() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1"]).await;

    let first = h
        .manager
        .settle(&code, OrderStatus::Completed, SettleReason::PaymentCallback, None)
        .unwrap();
    assert_eq!(first, SettleOutcome::Applied);
    let after_first = h.manager.storage().get_order(&code).unwrap().unwrap();

    // Providers deliver at-least-once: the second call must change nothing
    let second = h
        .manager
        .settle(&code, OrderStatus::Completed, SettleReason::PaymentCallback, None)
        .unwrap();
    assert_eq!(second, SettleOutcome::AlreadySettled);

    let after_second = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(after_first, after_second);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Booked);
}

#[tokio::test]
async fn test_settle_cancelled_releases_the_seats() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1", "seat:a2"]).await;

    h.manager
        .settle(&code, OrderStatus::Cancelled, SettleReason::BuyerCancelled, None)
        .unwrap();

    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.tickets.iter().all(|t| t.status == TicketStatus::Deactivated));

    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Available);
    assert_eq!(seat_status(&h.manager, "seat:a2"), SeatStatus::Available);
}

#[tokio::test]
async fn test_cancel_racing_a_completion_cannot_both_win() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1"]).await;

    let cancel = h
        .manager
        .settle(&code, OrderStatus::Cancelled, SettleReason::BuyerCancelled, None)
        .unwrap();
    assert_eq!(cancel, SettleOutcome::Applied);

    // The late provider callback loses and must not resurrect the order
    let callback = h
        .manager
        .settle(&code, OrderStatus::Completed, SettleReason::PaymentCallback, None)
        .unwrap();
    assert_eq!(callback, SettleOutcome::AlreadySettled);

    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Available);
}

#[tokio::test]
async fn test_booked_seats_are_never_silently_reassigned() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1"]).await;
    h.manager
        .settle(&code, OrderStatus::Completed, SettleReason::PaymentCallback, None)
        .unwrap();

    let err = h
        .manager
        .create_order(order_request("buyer:bob", &["seat:a1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::SeatConflict(_)));
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Booked);
}

#[tokio::test]
async fn test_settling_an_unknown_order_errors() {
    let h = create_test_manager();
    let err = h
        .manager
        .settle("ORD000000000000", OrderStatus::Cancelled, SettleReason::BuyerCancelled, None)
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(_)));
}

#[tokio::test]
async fn test_bulk_cancel_isolates_each_order() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1"]).await;

    let report = h.manager.cancel_pending(
        EVENT,
        BUYER,
        &[code.clone(), "ORD-unknown".to_string()],
    );
    assert_eq!(report.cancelled, vec![code]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].order_code, "ORD-unknown");
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Available);
}

#[tokio::test]
async fn test_bulk_cancel_enforces_ownership() {
    let h = create_test_manager();
    let code = open_order(&h, BUYER, &["seat:a1"]).await;

    let report = h.manager.cancel_pending(EVENT, "buyer:mallory", &[code.clone()]);
    assert!(report.cancelled.is_empty());
    assert_eq!(report.rejected.len(), 1);

    // Untouched: still pending, still held
    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::InTransaction);
}
