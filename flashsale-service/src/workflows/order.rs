//! Order workflow.

use flashsale_hotstore::{HotStore, HotStoreError};
use flashsale_store::Store;
use tracing::{debug, error, info, instrument, warn};

use crate::messages::OrderMessage;
use flashsale_bus::MessageBus;

/// Runs the order consumer loop until the bus connection closes.
///
/// For each delivery: decode (poison messages are discarded); read the
/// reservation record from the hot store; look up an existing order row by
/// reservation id (idempotent no-op if present); otherwise insert the order
/// row from the reservation's showtime and user ids.
#[instrument(skip_all)]
pub async fn run_order_consumer(hot_store: HotStore, store: Store, bus: MessageBus, queue: &str) {
    let mut consumer = match bus.consume(queue, "flashsale-order-consumer").await {
        Ok(consumer) => consumer,
        Err(err) => {
            error!(%err, "failed to start order consumer");
            return;
        }
    };

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(err) => {
                error!(%err, "order consumer delivery error");
                continue;
            }
        };

        let hot_store = hot_store.clone();
        let store = store.clone();
        tokio::spawn(async move {
            let payload: OrderMessage = match delivery.decode() {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "discarding undecodable order message");
                    if let Err(err) = delivery.nack_discard().await {
                        warn!(%err, "failed to nack undecodable order delivery");
                    }
                    return;
                }
            };

            match materialize_order(&hot_store, &store, payload.reservation_id).await {
                Ok(()) => {
                    if let Err(err) = delivery.ack().await {
                        warn!(%err, reservation_id = %payload.reservation_id, "failed to ack order delivery");
                    }
                }
                Err(MaterializeError::Transient(err)) => {
                    warn!(%err, reservation_id = %payload.reservation_id, "transient failure materializing order, requeuing");
                    if let Err(err) = delivery.nack_requeue().await {
                        error!(%err, reservation_id = %payload.reservation_id, "failed to nack order delivery for requeue");
                    }
                }
            }
        });
    }
}

enum MaterializeError {
    Transient(String),
}

async fn materialize_order(
    hot_store: &HotStore,
    store: &Store,
    reservation_id: flashsale_core::ReservationId,
) -> Result<(), MaterializeError> {
    if let Some(existing) = store
        .get_order(reservation_id)
        .await
        .map_err(|e| MaterializeError::Transient(e.to_string()))?
    {
        debug!(reservation_id = %existing.id, "order already exists, skipping");
        return Ok(());
    }

    let reservation = hot_store.get_reservation(reservation_id).await.map_err(|err| match err {
        HotStoreError::NotFound(_) | HotStoreError::Corrupt(_) => {
            MaterializeError::Transient(err.to_string())
        }
        other => MaterializeError::Transient(other.to_string()),
    })?;

    store
        .insert_order(reservation_id, reservation.showtime_id, reservation.user_id)
        .await
        .map_err(|e| MaterializeError::Transient(e.to_string()))?;

    info!(%reservation_id, "order materialized");
    Ok(())
}
