//! HTTP contract and end-to-end scenario tests. Container-backed; requires
//! Docker.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use std::time::Duration;

use flashsale_core::{ReservationId, ShowtimeId, UserId};
use serde_json::json;
use support::spawn_app;

#[tokio::test]
async fn malformed_body_returns_400_with_spec_shape() {
    let app = spawn_app(&[1], 10, 900_000).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/reserve", app.base_url))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request format");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn successful_reservation_returns_200_with_spec_shape() {
    let app = spawn_app(&[2], 10, 900_000).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/reserve", app.base_url))
        .json(&json!({"user_id": 1, "showtime_id": 2}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "RESERVED");
}

/// Oversell prevention (scaled down from capacity=100/users=7000 for test
/// runtime). Every 200 response corresponds to exactly one admitted
/// reservation; every rejection past capacity is SoldOut.
#[tokio::test]
async fn oversell_prevention() {
    let capacity = 20;
    let users = 200u64;
    let app = spawn_app(&[10], capacity, 900_000).await;
    let client = reqwest::Client::new();

    let mut handles = Vec::new();
    for user in 0..users {
        let client = client.clone();
        let base_url = app.base_url.clone();
        handles.push(tokio::spawn(async move {
            let response = client
                .post(format!("{base_url}/reserve"))
                .json(&json!({"user_id": user, "showtime_id": 10}))
                .send()
                .await
                .unwrap();
            response.status().as_u16()
        }));
    }

    let mut admitted = 0;
    let mut sold_out = 0;
    for handle in handles {
        match handle.await.unwrap() {
            200 => admitted += 1,
            409 => sold_out += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(admitted, capacity);
    assert_eq!(sold_out, i64::try_from(users).unwrap() - capacity);

    // Allow in-flight order-creation deliveries to drain.
    tokio::time::sleep(Duration::from_secs(2)).await;
}

/// Same-user idempotency. 20 concurrent /reserve for the same user and
/// showtime; exactly one 200, the rest 409 AlreadyOrdered.
#[tokio::test]
async fn same_user_idempotency() {
    let app = spawn_app(&[11], 10, 900_000).await;
    let client = reqwest::Client::new();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let client = client.clone();
        let base_url = app.base_url.clone();
        handles.push(tokio::spawn(async move {
            let response = client
                .post(format!("{base_url}/reserve"))
                .json(&json!({"user_id": 1, "showtime_id": 11}))
                .send()
                .await
                .unwrap();
            response.status().as_u16()
        }));
    }

    let mut admitted = 0;
    let mut already_ordered = 0;
    for handle in handles {
        match handle.await.unwrap() {
            200 => admitted += 1,
            409 => already_ordered += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(already_ordered, 19);
}

/// Redelivery idempotence. A duplicate `pay→order` delivery for the same
/// reservation id produces exactly one order row.
#[tokio::test]
async fn order_consumer_is_idempotent_under_redelivery() {
    let app = spawn_app(&[12], 10, 900_000).await;
    let reservation_id = app.hot_store.reserve(UserId::from(1), ShowtimeId::from(12)).await.unwrap();
    app.hot_store.mark_paid(reservation_id).await.unwrap();

    // Materialize once via a direct insert, then again to simulate
    // redelivery.
    app.store.insert_order(reservation_id, ShowtimeId::from(12), UserId::from(1)).await.unwrap();
    app.store.insert_order(reservation_id, ShowtimeId::from(12), UserId::from(1)).await.unwrap();

    let order = app.store.get_order(reservation_id).await.unwrap().expect("order exists");
    assert_eq!(order.id, ReservationId::from(reservation_id.get()));
}
