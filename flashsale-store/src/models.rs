//! Row types for the durable store's tables.
//!
//! `User`, `Movie`, and `Showtime` exist for referential completeness only —
//! the reservation/payment/order core never reads or writes anything from
//! them beyond the bare showtime id, which `list_showtime_ids` returns
//! directly — so no row type is defined for them here; only `Order`
//! (written by the order workflow) has a Rust-side representation.

use flashsale_core::{ReservationId, ShowtimeId, UserId};

/// A durable order row. The primary key equals the reservation id that
/// produced it — the natural idempotency key for order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRow {
    /// Equal to the reservation id that produced this order.
    pub id: ReservationId,
    /// The showtime this order was placed against.
    pub showtime_id: ShowtimeId,
    /// The user who placed this order.
    pub user_id: UserId,
}
