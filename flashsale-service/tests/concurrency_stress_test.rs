//! Timeout and payment-race scenarios. Container-backed; requires Docker.
//! Uses a short delay-queue TTL so the test doesn't wait out the real
//! 15-minute default.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use std::time::Duration;

use flashsale_core::{ReservationId, ReservationStatus};
use serde_json::json;
use support::spawn_app;

/// Timeout rollback. Capacity=1, user A reserves and never pays; once the
/// (shortened) TTL elapses, inventory is restored and user B can reserve
/// successfully.
#[tokio::test]
async fn timeout_restores_inventory_for_a_different_user() {
    // A 3s delay TTL stands in for the production 15-minute window.
    let app = spawn_app(&[20], 1, 3_000).await;
    let client = reqwest::Client::new();

    let first = client
        .post(format!("{}/reserve", app.base_url))
        .json(&json!({"user_id": 100, "showtime_id": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    // Capacity is exhausted while user 100's reservation is still RESERVED.
    let second = client
        .post(format!("{}/reserve", app.base_url))
        .json(&json!({"user_id": 200, "showtime_id": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);

    // Wait past the delay TTL for the dead-lettered timeout to land and
    // the timeout consumer to process it.
    tokio::time::sleep(Duration::from_secs(5)).await;

    let third = client
        .post(format!("{}/reserve", app.base_url))
        .json(&json!({"user_id": 200, "showtime_id": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(third.status(), 200);

    // User 100 still cannot re-reserve: its user-showtime mark was never
    // cleared by the timeout.
    let fourth = client
        .post(format!("{}/reserve", app.base_url))
        .json(&json!({"user_id": 100, "showtime_id": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(fourth.status(), 409);
}

/// Pay/timeout race. The reservation ends in exactly one terminal state,
/// never both, never neither.
#[tokio::test]
async fn reservation_ends_in_exactly_one_terminal_state() {
    let app = spawn_app(&[21], 1, 500).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/reserve", app.base_url))
        .json(&json!({"user_id": 1, "showtime_id": 21}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Let both the pay simulation (100-1000ms) and the 500ms delay TTL
    // race to completion.
    tokio::time::sleep(Duration::from_secs(3)).await;

    // This is the only reservation made against a freshly-initialized hot
    // store, so its id is deterministically 1.
    let reservation = app.hot_store.get_reservation(ReservationId::from(1)).await.unwrap();
    assert!(reservation.status.is_terminal());

    match reservation.status {
        ReservationStatus::Paid => {
            let order = app.store.get_order(ReservationId::from(1)).await.unwrap();
            assert!(order.is_some(), "PAID reservation must have a materialized order");

            // PAID won: inventory stays at 0.
            let exhausted = client
                .post(format!("{}/reserve", app.base_url))
                .json(&json!({"user_id": 2, "showtime_id": 21}))
                .send()
                .await
                .unwrap();
            assert_eq!(exhausted.status(), 409);
        }
        ReservationStatus::Timeout => {
            let order = app.store.get_order(ReservationId::from(1)).await.unwrap();
            assert!(order.is_none(), "TIMEOUT reservation must not have an order");

            // TIMEOUT won: inventory was restored to 1.
            let admitted = client
                .post(format!("{}/reserve", app.base_url))
                .json(&json!({"user_id": 2, "showtime_id": 21}))
                .send()
                .await
                .unwrap();
            assert_eq!(admitted.status(), 200);
        }
        ReservationStatus::Reserved => unreachable!("checked is_terminal above"),
    }
}
