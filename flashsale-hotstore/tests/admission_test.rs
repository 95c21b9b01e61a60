//! Integration tests against a real Redis instance.
//!
//! Requires Docker; spins up a disposable Redis container via
//! `testcontainers`, mirroring the pattern the donor
//! `composable-rust-postgres` crate's `tests/integration_tests.rs` uses for
//! Postgres. Run with `cargo test -p flashsale-hotstore --test admission_test`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flashsale_core::{ReservationStatus, ShowtimeId, UserId};
use flashsale_hotstore::{HotStore, HotStoreError};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::Redis;

async fn hot_store() -> HotStore {
    let container = Redis::default()
        .start()
        .await
        .expect("failed to start redis container");
    let port = container
        .get_host_port_ipv4(6379)
        .await
        .expect("failed to map redis port");
    let url = format!("redis://127.0.0.1:{port}");

    // Leak the container so it outlives the test; testcontainers tears
    // down on process exit. Each test gets its own container.
    Box::leak(Box::new(container));

    HotStore::connect(&url).await.expect("failed to connect")
}

#[tokio::test]
async fn reserve_then_mark_paid_succeeds_once() {
    let store = hot_store().await;
    let showtime = ShowtimeId::from(1);
    store.init(&[showtime], 1).await.unwrap();

    let reservation_id = store.reserve(UserId::from(100), showtime).await.unwrap();
    store.mark_paid(reservation_id).await.unwrap();

    let record = store.get_reservation(reservation_id).await.unwrap();
    assert_eq!(record.status, ReservationStatus::Paid);

    let second = store.mark_paid(reservation_id).await;
    assert!(matches!(second, Err(HotStoreError::InvalidState)));
}

#[tokio::test]
async fn sold_out_when_capacity_exhausted() {
    let store = hot_store().await;
    let showtime = ShowtimeId::from(2);
    store.init(&[showtime], 1).await.unwrap();

    store.reserve(UserId::from(1), showtime).await.unwrap();
    let second = store.reserve(UserId::from(2), showtime).await;

    assert!(matches!(second, Err(HotStoreError::SoldOut)));
}

#[tokio::test]
async fn same_user_cannot_reserve_twice_for_the_same_showtime() {
    let store = hot_store().await;
    let showtime = ShowtimeId::from(3);
    store.init(&[showtime], 10).await.unwrap();

    let user = UserId::from(1);
    store.reserve(user, showtime).await.unwrap();
    let second = store.reserve(user, showtime).await;

    assert!(matches!(second, Err(HotStoreError::AlreadyOrdered)));
}

#[tokio::test]
async fn timeout_restores_inventory_but_not_for_an_already_paid_reservation() {
    let store = hot_store().await;
    let showtime = ShowtimeId::from(4);
    store.init(&[showtime], 1).await.unwrap();

    let paid = store.reserve(UserId::from(1), showtime).await.unwrap();
    store.mark_paid(paid).await.unwrap();

    // Timeout on an already-paid reservation is a no-op: InvalidState, no
    // rollback.
    let result = store.mark_timeout(paid).await;
    assert!(matches!(result, Err(HotStoreError::InvalidState)));

    // Inventory stays at zero: the only reservation ever made is PAID.
    let exhausted = store.reserve(UserId::from(2), showtime).await;
    assert!(matches!(exhausted, Err(HotStoreError::SoldOut)));
}

#[tokio::test]
async fn concurrent_reservations_never_oversell() {
    let store = hot_store().await;
    let showtime = ShowtimeId::from(5);
    let capacity = 20;
    store.init(&[showtime], capacity).await.unwrap();

    let mut handles = Vec::new();
    for user in 0..200u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.reserve(UserId::from(user), showtime).await.is_ok()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, capacity);
}
