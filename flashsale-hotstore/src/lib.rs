//! The atomic in-memory contention layer ("hot store") for the flash-sale
//! reservation pipeline.
//!
//! [`HotStore`] is the only component permitted to mutate inventory
//! counters and reservation records. Every operation that reads then writes
//! more than one key runs as a single Redis Lua script
//! ([`scripts`]), which Redis executes to completion before serving any
//! other client — this gives linearizable ordering across the keys each
//! operation touches without a distributed lock.

mod error;
mod keys;
mod scripts;

pub use error::HotStoreError;
pub use keys::{reservation_key, showtime_remaining_key, user_showtime_ordered_key};

use std::collections::HashMap;

use flashsale_core::{Reservation, ReservationId, ReservationStatus, ShowtimeId, UserId};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info, instrument};

/// Atomic Redis-backed inventory and reservation store.
///
/// Cloning a `HotStore` is cheap: [`ConnectionManager`] multiplexes a
/// single connection (with automatic reconnection) across clones, the same
/// pooling model the donor `ticketing` example configures its `redis` crate
/// dependency for.
#[derive(Clone)]
pub struct HotStore {
    conn: ConnectionManager,
}

impl HotStore {
    /// Connects to the Redis instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`HotStoreError::Infra`] if the address is malformed or the
    /// connection cannot be established.
    #[instrument(skip_all, fields(url))]
    pub async fn connect(url: &str) -> Result<Self, HotStoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("hot store connected");
        Ok(Self { conn })
    }

    /// Flushes the hot store and seeds every showtime id in `showtime_ids`
    /// with `capacity` remaining tickets.
    ///
    /// # Errors
    ///
    /// Returns [`HotStoreError::Infra`] on any Redis communication failure.
    #[instrument(skip(self, showtime_ids), fields(count = showtime_ids.len(), capacity))]
    pub async fn init(&self, showtime_ids: &[ShowtimeId], capacity: i64) -> Result<(), HotStoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await?;

        if showtime_ids.is_empty() {
            return Ok(());
        }

        let mut args: Vec<String> = Vec::with_capacity(showtime_ids.len() * 2);
        for id in showtime_ids {
            args.push(showtime_remaining_key(*id));
            args.push(capacity.to_string());
        }

        scripts::INIT_TICKETS
            .arg(args)
            .invoke_async::<i64>(&mut conn)
            .await?;

        info!(seeded = showtime_ids.len(), capacity, "hot store initialized");
        Ok(())
    }

    /// Attempts to admit `user_id` for one ticket to `showtime_id`.
    ///
    /// # Errors
    ///
    /// - [`HotStoreError::SoldOut`] if the showtime has no tickets left.
    /// - [`HotStoreError::AlreadyOrdered`] if the user already holds a
    ///   reservation for this showtime.
    /// - [`HotStoreError::Infra`] on transient Redis failure.
    #[instrument(skip(self), fields(%user_id, %showtime_id))]
    pub async fn reserve(
        &self,
        user_id: UserId,
        showtime_id: ShowtimeId,
    ) -> Result<ReservationId, HotStoreError> {
        let mut conn = self.conn.clone();
        let remaining_key = showtime_remaining_key(showtime_id);
        let ordered_key = user_showtime_ordered_key(user_id, showtime_id);

        let result: i64 = scripts::RESERVE_TICKET
            .key(&remaining_key)
            .key(keys::RESERVATION_ID_SEQ_KEY)
            .key(&ordered_key)
            .arg(showtime_id.get())
            .arg(user_id.get())
            .invoke_async(&mut conn)
            .await?;

        match result {
            scripts::SOLD_OUT => Err(HotStoreError::SoldOut),
            scripts::ALREADY_ORDERED => Err(HotStoreError::AlreadyOrdered),
            id if id > 0 => {
                let id = ReservationId::from(u64::try_from(id).unwrap_or_default());
                debug!(reservation_id = %id, "reservation admitted");
                Ok(id)
            }
            other => Err(HotStoreError::Corrupt(format!(
                "unexpected reserve script result: {other}"
            ))),
        }
    }

    /// Transitions a reservation from `RESERVED` to `PAID`.
    ///
    /// # Errors
    ///
    /// Returns [`HotStoreError::InvalidState`] if the reservation was
    /// already `PAID` or `TIMEOUT` — this is the normal outcome of losing a
    /// race against the timeout consumer, not a fault.
    #[instrument(skip(self), fields(%reservation_id))]
    pub async fn mark_paid(&self, reservation_id: ReservationId) -> Result<(), HotStoreError> {
        self.run_transition(&scripts::MARK_PAID, reservation_id).await
    }

    /// Transitions a reservation from `RESERVED` to `TIMEOUT` and restores
    /// one ticket to the owning showtime's counter, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`HotStoreError::InvalidState`] if the reservation was
    /// already `PAID` — payment won the race, and no rollback happens.
    #[instrument(skip(self), fields(%reservation_id))]
    pub async fn mark_timeout(&self, reservation_id: ReservationId) -> Result<(), HotStoreError> {
        self.run_transition(&scripts::MARK_TIMEOUT, reservation_id).await
    }

    async fn run_transition(
        &self,
        script: &redis::Script,
        reservation_id: ReservationId,
    ) -> Result<(), HotStoreError> {
        let mut conn = self.conn.clone();
        let key = reservation_key(reservation_id);

        let result: i64 = script.key(&key).invoke_async(&mut conn).await?;

        match result {
            scripts::INVALID_STATE => Err(HotStoreError::InvalidState),
            1 => Ok(()),
            other => Err(HotStoreError::Corrupt(format!(
                "unexpected transition script result: {other}"
            ))),
        }
    }

    /// Reads a reservation's current state. A pure read; never mutates.
    ///
    /// # Errors
    ///
    /// Returns [`HotStoreError::NotFound`] if no reservation with this id
    /// exists, or [`HotStoreError::Corrupt`] if the stored hash is missing
    /// fields or holds an unrecognized status string.
    #[instrument(skip(self), fields(%reservation_id))]
    pub async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, HotStoreError> {
        let mut conn = self.conn.clone();
        let key = reservation_key(reservation_id);

        let fields: HashMap<String, String> = conn.hgetall(&key).await?;
        if fields.is_empty() {
            return Err(HotStoreError::NotFound(reservation_id.get()));
        }

        let showtime_id = fields
            .get("showtime_id")
            .ok_or_else(|| HotStoreError::Corrupt(format!("{key} missing showtime_id")))?
            .parse::<u64>()
            .map_err(|e| HotStoreError::Corrupt(e.to_string()))?;
        let user_id = fields
            .get("user_id")
            .ok_or_else(|| HotStoreError::Corrupt(format!("{key} missing user_id")))?
            .parse::<u64>()
            .map_err(|e| HotStoreError::Corrupt(e.to_string()))?;
        let status = fields
            .get("status")
            .ok_or_else(|| HotStoreError::Corrupt(format!("{key} missing status")))?;
        let status = ReservationStatus::parse(status)
            .map_err(|bad| HotStoreError::Corrupt(format!("unknown status {bad}")))?;

        Ok(Reservation {
            id: reservation_id,
            showtime_id: ShowtimeId::from(showtime_id),
            user_id: UserId::from(user_id),
            status,
        })
    }
}
