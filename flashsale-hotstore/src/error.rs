//! Hot-store error taxonomy.

use thiserror::Error;

/// Errors surfaced by [`crate::HotStore`].
///
/// `SoldOut`, `AlreadyOrdered`, and `InvalidState` are expected admission
/// and race outcomes, not faults — callers match on them explicitly rather
/// than treating every `Err` as an infrastructure failure.
#[derive(Debug, Error)]
pub enum HotStoreError {
    /// The showtime has no tickets remaining.
    #[error("tickets sold out")]
    SoldOut,

    /// The user already holds a non-timed-out reservation for this showtime.
    #[error("user already ordered this showtime")]
    AlreadyOrdered,

    /// The reservation was not in `RESERVED` status when a transition was
    /// attempted; the other transition already happened.
    #[error("reservation is not in RESERVED status")]
    InvalidState,

    /// The reservation id is unknown to the hot store.
    #[error("reservation {0} not found")]
    NotFound(u64),

    /// A Redis hash field held a value that could not be parsed back into
    /// the expected domain type (corrupt or foreign data).
    #[error("malformed reservation record: {0}")]
    Corrupt(String),

    /// Transient connectivity or protocol failure talking to Redis.
    #[error("hot store unavailable: {0}")]
    Infra(#[from] redis::RedisError),
}
