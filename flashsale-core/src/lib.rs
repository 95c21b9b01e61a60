//! Domain types shared by the flash-sale reservation pipeline.
//!
//! This crate holds the data that every layer of the pipeline (hot store,
//! message bus payloads, durable store, HTTP handlers) agrees on: the id
//! newtypes and the reservation status state machine. The durable order
//! record lives in `flashsale-store` instead, next to the SQL that writes
//! it. This crate intentionally carries no I/O — every other crate in the
//! workspace depends on it, never the other way around.

mod ids;
mod reservation;

pub use ids::{ReservationId, ShowtimeId, UserId};
pub use reservation::{Reservation, ReservationStatus};

/// Number of tickets a showtime starts with when no capacity is configured
/// explicitly.
pub const DEFAULT_CAPACITY: i64 = 100;
