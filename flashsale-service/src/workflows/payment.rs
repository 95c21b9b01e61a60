//! Payment workflow: two independent consumers, `pay` and `timeout`, each
//! dispatching per-delivery work onto its own task so payment-simulation
//! latency doesn't serialize the consumer loop.

use std::time::Duration;

use flashsale_bus::topology::{ORDER_QUEUE, TIMEOUT_QUEUE};
use flashsale_bus::MessageBus;
use flashsale_hotstore::{HotStore, HotStoreError};
use rand::Rng;
use tracing::{debug, error, info, instrument, warn};

use crate::messages::{OrderMessage, PayMessage, TimeoutMessage};

/// Runs the pay consumer loop until the bus connection closes.
///
/// For each delivery: decode (poison messages are discarded), simulate
/// payment with a random [100, 1000] ms delay, then attempt `markPaid`.
/// Each delivery is dispatched onto its own task.
#[instrument(skip_all)]
pub async fn run_pay_consumer(hot_store: HotStore, bus: MessageBus, queue: &str) {
    let mut consumer = match bus.consume(queue, "flashsale-pay-consumer").await {
        Ok(consumer) => consumer,
        Err(err) => {
            error!(%err, "failed to start pay consumer");
            return;
        }
    };

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(err) => {
                error!(%err, "pay consumer delivery error");
                continue;
            }
        };

        let hot_store = hot_store.clone();
        let bus = bus.clone();
        tokio::spawn(async move {
            let payload: PayMessage = match delivery.decode() {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "discarding undecodable pay message");
                    if let Err(err) = delivery.nack_discard().await {
                        warn!(%err, "failed to nack undecodable pay delivery");
                    }
                    return;
                }
            };

            start_mock_pay().await;

            match hot_store.mark_paid(payload.reservation_id).await {
                Ok(()) => {
                    // mark_paid already succeeded, so the reservation is
                    // PAID regardless of what happens next. Redelivering
                    // this pay message would just hit InvalidState below
                    // and ack without ever publishing the order, so the
                    // publish is retried here directly until it lands.
                    let order = OrderMessage { reservation_id: payload.reservation_id };
                    publish_order_until_success(&bus, &order).await;
                    debug!(reservation_id = %payload.reservation_id, "payment succeeded, order enqueued");
                    if let Err(err) = delivery.ack().await {
                        warn!(%err, reservation_id = %payload.reservation_id, "failed to ack pay delivery");
                    }
                }
                Err(HotStoreError::InvalidState) => {
                    // Already timed out; payment lost the race.
                    info!(reservation_id = %payload.reservation_id, "payment arrived after timeout, dropping");
                    if let Err(err) = delivery.ack().await {
                        warn!(%err, reservation_id = %payload.reservation_id, "failed to ack pay delivery");
                    }
                }
                Err(err) => {
                    warn!(%err, reservation_id = %payload.reservation_id, "transient hot-store failure, requeuing");
                    if let Err(err) = delivery.nack_requeue().await {
                        error!(%err, reservation_id = %payload.reservation_id, "failed to nack pay delivery for requeue");
                    }
                }
            }
        });
    }
}

/// Runs the timeout consumer loop until the bus connection closes.
///
/// For each delivery: decode (poison messages are discarded), attempt
/// `markTimeout`. `InvalidState` means payment already won the race; the
/// delivery is acknowledged with no rollback.
#[instrument(skip_all)]
pub async fn run_timeout_consumer(hot_store: HotStore, bus: MessageBus) {
    let mut consumer = match bus.consume(TIMEOUT_QUEUE, "flashsale-timeout-consumer").await {
        Ok(consumer) => consumer,
        Err(err) => {
            error!(%err, "failed to start timeout consumer");
            return;
        }
    };

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(err) => {
                error!(%err, "timeout consumer delivery error");
                continue;
            }
        };

        let hot_store = hot_store.clone();
        tokio::spawn(async move {
            let payload: TimeoutMessage = match delivery.decode() {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "discarding undecodable timeout message");
                    if let Err(err) = delivery.nack_discard().await {
                        warn!(%err, "failed to nack undecodable timeout delivery");
                    }
                    return;
                }
            };

            match hot_store.mark_timeout(payload.reservation_id).await {
                Ok(()) => {
                    debug!(reservation_id = %payload.reservation_id, "reservation timed out, inventory restored");
                    if let Err(err) = delivery.ack().await {
                        warn!(%err, reservation_id = %payload.reservation_id, "failed to ack timeout delivery");
                    }
                }
                Err(HotStoreError::InvalidState) => {
                    info!(reservation_id = %payload.reservation_id, "timeout arrived after payment, no rollback");
                    if let Err(err) = delivery.ack().await {
                        warn!(%err, reservation_id = %payload.reservation_id, "failed to ack timeout delivery");
                    }
                }
                Err(err) => {
                    warn!(%err, reservation_id = %payload.reservation_id, "transient hot-store failure, requeuing");
                    if let Err(err) = delivery.nack_requeue().await {
                        error!(%err, reservation_id = %payload.reservation_id, "failed to nack timeout delivery for requeue");
                    }
                }
            }
        });
    }
}

/// Simulates an external payment-service-provider round trip with bounded
/// random latency.
async fn start_mock_pay() {
    let millis = rand::thread_rng().gen_range(100..=1000);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Retries `publish_json(ORDER_QUEUE, ...)` with capped exponential backoff
/// until it succeeds.
///
/// Once `mark_paid` has returned `Ok`, the reservation is PAID for good —
/// there is no other path back to this publish, since a redelivered pay
/// message would just find the reservation already PAID and short-circuit.
/// So this loops in place rather than handing the retry back to the queue.
async fn publish_order_until_success(bus: &MessageBus, order: &OrderMessage) {
    let mut backoff = Duration::from_millis(200);
    let max_backoff = Duration::from_secs(30);
    let mut attempt: u32 = 0;

    loop {
        match bus.publish_json(ORDER_QUEUE, order).await {
            Ok(()) => return,
            Err(err) => {
                attempt += 1;
                error!(
                    %err,
                    reservation_id = %order.reservation_id,
                    attempt,
                    "failed to publish order-create, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(max_backoff);
            }
        }
    }
}
