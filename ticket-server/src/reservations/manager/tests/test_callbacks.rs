use super::*;

async fn open_order(h: &TestHarness) -> String {
    h.manager
        .create_order(order_request(BUYER, &["seat:a1"]))
        .await
        .unwrap()
        .order_code
}

#[tokio::test]
async fn test_callback_settles_the_order() {
    let h = create_test_manager();
    let code = open_order(&h).await;

    let outcome = h
        .manager
        .apply_callback("mock", callback_body(&code, "completed", "cb-1"))
        .unwrap();
    assert_eq!(outcome, SettleOutcome::Applied);

    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    // The triggering payload is kept with the settlement
    let settlement = order.settlement.unwrap();
    assert_eq!(settlement.reason, SettleReason::PaymentCallback);
    assert!(settlement.provider_payload.is_some());
}

#[tokio::test]
async fn test_duplicate_callbacks_are_acknowledged_no_ops() {
    let h = create_test_manager();
    let code = open_order(&h).await;

    h.manager
        .apply_callback("mock", callback_body(&code, "completed", "cb-1"))
        .unwrap();
    let duplicate = h
        .manager
        .apply_callback("mock", callback_body(&code, "completed", "cb-1"))
        .unwrap();
    assert_eq!(duplicate, SettleOutcome::AlreadySettled);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Booked);
}

#[tokio::test]
async fn test_unknown_order_callback_is_acknowledged() {
    let h = create_test_manager();

    // Test notifications / unknown orders never error back at the provider
    let outcome = h
        .manager
        .apply_callback("mock", callback_body("ORD-test-notification", "completed", "cb-9"))
        .unwrap();
    assert_eq!(outcome, SettleOutcome::AlreadySettled);
}

#[tokio::test]
async fn test_pending_callback_changes_nothing() {
    let h = create_test_manager();
    let code = open_order(&h).await;

    let outcome = h
        .manager
        .apply_callback("mock", callback_body(&code, "pending", "cb-2"))
        .unwrap();
    assert_eq!(outcome, SettleOutcome::AlreadySettled);

    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::InTransaction);
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let h = create_test_manager();
    let code = open_order(&h).await;

    let err = h
        .manager
        .apply_callback("paypal", callback_body(&code, "completed", "cb-3"))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Provider(_)));
}

#[tokio::test]
async fn test_malformed_callback_is_rejected() {
    let h = create_test_manager();

    let payload = crate::payments::CallbackPayload {
        body: serde_json::json!({"unexpected": "shape"}),
        callback_token: None,
    };
    let err = h.manager.apply_callback("mock", payload).unwrap_err();
    assert!(matches!(err, ManagerError::Provider(_)));
}

#[tokio::test]
async fn test_archived_orders_still_acknowledge_late_callbacks() {
    let h = create_test_manager();
    let code = open_order(&h).await;

    h.manager
        .apply_callback("mock", callback_body(&code, "completed", "cb-1"))
        .unwrap();

    // Worker moves the terminal order off the hot tables
    assert!(h.manager.storage().archive_order(&code).unwrap());
    assert!(h.manager.storage().active_order_codes().unwrap().is_empty());
    assert!(h.manager.storage().archived_order(&code).unwrap().is_some());

    // A very late redelivery is still a harmless ack
    let late = h
        .manager
        .apply_callback("mock", callback_body(&code, "completed", "cb-99"))
        .unwrap();
    assert_eq!(late, SettleOutcome::AlreadySettled);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Booked);
}

#[tokio::test]
async fn test_cancelled_callback_releases_seats() {
    let h = create_test_manager();
    let code = open_order(&h).await;

    let outcome = h
        .manager
        .apply_callback("mock", callback_body(&code, "cancelled", "cb-4"))
        .unwrap();
    assert_eq!(outcome, SettleOutcome::Applied);

    let order = h.manager.storage().get_order(&code).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(seat_status(&h.manager, "seat:a1"), SeatStatus::Available);
}
