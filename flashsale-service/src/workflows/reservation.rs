//! Reservation workflow: the sole entry point invoked by the HTTP handler.

use flashsale_bus::topology::{PAY_QUEUE, TIMEOUT_DELAY_QUEUE};
use flashsale_bus::MessageBus;
use flashsale_core::{ReservationId, ShowtimeId, UserId};
use flashsale_hotstore::HotStore;
use tracing::{info, instrument};

use crate::error::ReserveError;
use crate::messages::{PayMessage, TimeoutMessage};

/// Coordinates hot-store admission with the two follow-up publishes.
#[derive(Clone)]
pub struct ReservationWorkflow {
    hot_store: HotStore,
    bus: MessageBus,
}

impl ReservationWorkflow {
    /// Builds a workflow around the given hot store and bus handles.
    #[must_use]
    pub const fn new(hot_store: HotStore, bus: MessageBus) -> Self {
        Self { hot_store, bus }
    }

    /// Admits `user_id` for one ticket to `showtime_id`, then publishes the
    /// pay and timeout messages.
    ///
    /// Publication failures after a successful admission are surfaced as
    /// [`ReserveError::PublishFailed`]; the reservation remains `RESERVED`
    /// in the hot store rather than being rolled back — no compensating
    /// call exists for this reservation pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ReserveError::SoldOut`] or [`ReserveError::AlreadyOrdered`]
    /// for the two expected admission rejections, or
    /// [`ReserveError::PublishFailed`]/[`ReserveError::Infra`] for anything
    /// else.
    #[instrument(skip(self), fields(%user_id, %showtime_id))]
    pub async fn reserve(&self, user_id: UserId, showtime_id: ShowtimeId) -> Result<(), ReserveError> {
        let reservation_id = self.hot_store.reserve(user_id, showtime_id).await?;

        self.publish_follow_ups(reservation_id).await?;

        info!(%reservation_id, "reservation admitted");
        Ok(())
    }

    async fn publish_follow_ups(&self, reservation_id: ReservationId) -> Result<(), ReserveError> {
        let pay = PayMessage { reservation_id, price: None };
        self.bus
            .publish_json(PAY_QUEUE, &pay)
            .await
            .map_err(|e| ReserveError::PublishFailed(e.to_string()))?;

        let timeout = TimeoutMessage { reservation_id };
        self.bus
            .publish_json(TIMEOUT_DELAY_QUEUE, &timeout)
            .await
            .map_err(|e| ReserveError::PublishFailed(e.to_string()))?;

        Ok(())
    }
}
