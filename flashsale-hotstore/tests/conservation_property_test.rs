//! Conservation invariant under randomized reserve/timeout interleavings.
//!
//! Requires Docker; one container backs every case in the single
//! `proptest!` test. Mirrors the donor `ticketing` example's
//! `concurrency_stress_test.rs` in spirit, but drives the sequence with
//! `proptest` instead of a fixed scenario.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flashsale_core::{ReservationId, ReservationStatus, ShowtimeId, UserId};
use flashsale_hotstore::HotStore;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::Redis;

const CAPACITY: i64 = 5;

#[derive(Debug, Clone, Copy)]
enum Action {
    Reserve(u64),
    Timeout(usize),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![(0u64..10).prop_map(Action::Reserve), (0usize..10).prop_map(Action::Timeout),]
}

async fn new_hot_store() -> HotStore {
    let container = Redis::default().start().await.expect("failed to start redis container");
    let port = container.get_host_port_ipv4(6379).await.expect("failed to map redis port");
    let url = format!("redis://127.0.0.1:{port}");

    // Leaked so the container outlives this proptest case; testcontainers
    // tears down on process exit.
    Box::leak(Box::new(container));

    HotStore::connect(&url).await.expect("failed to connect")
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 20, ..ProptestConfig::default() })]

    /// No sequence of reserves and timeouts against a single showtime ever
    /// lets more than `CAPACITY` reservations hold a ticket at once, and
    /// timing every held reservation out always restores exactly
    /// `CAPACITY` tickets — nothing leaks, nothing oversells.
    #[test]
    fn capacity_is_conserved_across_any_reserve_timeout_sequence(
        actions in proptest::collection::vec(action_strategy(), 0..30),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result: Result<(), TestCaseError> = runtime.block_on(async {
            let store = new_hot_store().await;
            let showtime = ShowtimeId::from(1);
            store.init(&[showtime], CAPACITY).await.unwrap();

            let mut held: Vec<ReservationId> = Vec::new();

            for action in actions {
                match action {
                    Action::Reserve(user) => {
                        if let Ok(id) = store.reserve(UserId::from(user), showtime).await {
                            held.push(id);
                        }
                    }
                    Action::Timeout(idx) => {
                        if let Some(id) = held.get(idx % held.len().max(1)).copied() {
                            let _ = store.mark_timeout(id).await;
                        }
                    }
                }

                let mut live = 0i64;
                for id in &held {
                    let record = store.get_reservation(*id).await.unwrap();
                    if !matches!(record.status, ReservationStatus::Timeout) {
                        live += 1;
                    }
                }
                prop_assert!(live <= CAPACITY);
            }

            for id in held {
                let _ = store.mark_timeout(id).await;
            }

            let mut admitted: i64 = 0;
            for user in 1_000..(1_000 + CAPACITY as u64) {
                if store.reserve(UserId::from(user), showtime).await.is_ok() {
                    admitted += 1;
                }
            }
            prop_assert_eq!(admitted, CAPACITY);

            Ok(())
        });
        result?;
    }
}
