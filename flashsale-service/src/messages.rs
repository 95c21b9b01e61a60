//! Wire payloads carried over the message bus.

use flashsale_core::ReservationId;
use serde::{Deserialize, Serialize};

/// Published to `reserve→pay`. `price` is carried for forward
/// compatibility with the original system but is never read — price
/// calculation is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayMessage {
    /// The reservation awaiting payment.
    pub reservation_id: ReservationId,
    /// Unused; reserved for a future price-calculation feature.
    pub price: Option<f64>,
}

/// Published to `reserve→timeout` and, after the TTL, read from
/// `pay.timeout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutMessage {
    /// The reservation whose payment window has expired.
    pub reservation_id: ReservationId,
}

/// Published to `pay→order` on a successful mock payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMessage {
    /// The reservation to materialize as an order.
    pub reservation_id: ReservationId,
}
