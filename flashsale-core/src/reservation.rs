//! The reservation record and its status state machine.

use serde::{Deserialize, Serialize};

use crate::{ReservationId, ShowtimeId, UserId};

/// A reservation's lifecycle status.
///
/// Transitions only flow `Reserved -> Paid` or `Reserved -> Timeout`; both
/// are terminal. No transition ever runs in reverse, and the two terminal
/// states are mutually exclusive for a given reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Admission succeeded; payment has not yet been confirmed or timed out.
    Reserved,
    /// The payment consumer confirmed payment before the timeout fired.
    Paid,
    /// The timeout consumer fired before payment was confirmed.
    Timeout,
}

impl ReservationStatus {
    /// The wire/hot-store representation, matching the original Lua
    /// scripts' string literals (`"RESERVED"`, `"PAID"`, `"TIMEOUT"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reserved => "RESERVED",
            Self::Paid => "PAID",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Parses the hot-store string representation.
    ///
    /// # Errors
    ///
    /// Returns the original string back as an `Err` if it does not match one
    /// of the three known statuses.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "RESERVED" => Ok(Self::Reserved),
            "PAID" => Ok(Self::Paid),
            "TIMEOUT" => Ok(Self::Timeout),
            other => Err(other.to_string()),
        }
    }

    /// Whether this status can no longer transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Timeout)
    }
}

/// A reservation record as held by the hot store.
///
/// The order id, when one exists, equals `id` — the idempotency key that
/// lets the order workflow short-circuit redelivered messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// The reservation id, allocated by the hot store's dense counter.
    pub id: ReservationId,
    /// The showtime this reservation claims a ticket against.
    pub showtime_id: ShowtimeId,
    /// The user that holds the reservation.
    pub user_id: UserId,
    /// Current lifecycle status.
    pub status: ReservationStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_wire_string() {
        for status in [
            ReservationStatus::Reserved,
            ReservationStatus::Paid,
            ReservationStatus::Timeout,
        ] {
            assert_eq!(
                ReservationStatus::parse(status.as_str()).unwrap(),
                status
            );
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!(ReservationStatus::parse("CANCELLED").is_err());
    }

    #[test]
    fn only_paid_and_timeout_are_terminal() {
        assert!(!ReservationStatus::Reserved.is_terminal());
        assert!(ReservationStatus::Paid.is_terminal());
        assert!(ReservationStatus::Timeout.is_terminal());
    }
}
