//! Hot-store key layout.
//!
//! Every key touched by the Lua scripts in [`crate::scripts`] must follow
//! these formats exactly — the scripts build a couple of the keys
//! themselves from fields read out of the reservation hash, so the
//! formatting here and inside the scripts must agree byte-for-byte.

use flashsale_core::{ReservationId, ShowtimeId, UserId};

/// `reservation:{id}` — hash with fields `showtime_id`, `user_id`, `status`.
#[must_use]
pub fn reservation_key(id: ReservationId) -> String {
    format!("reservation:{id}")
}

/// `reservation:id:seq` — the dense reservation id allocator.
pub const RESERVATION_ID_SEQ_KEY: &str = "reservation:id:seq";

/// `showtime:{id}:ticket:remain` — the live remaining-ticket counter.
#[must_use]
pub fn showtime_remaining_key(showtime_id: ShowtimeId) -> String {
    format!("showtime:{showtime_id}:ticket:remain")
}

/// `user:{uid}:showtime:{sid}:ordered` — the no-TTL reservation sentinel.
#[must_use]
pub fn user_showtime_ordered_key(user_id: UserId, showtime_id: ShowtimeId) -> String {
    format!("user:{user_id}:showtime:{showtime_id}:ordered")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_the_documented_layout() {
        assert_eq!(reservation_key(ReservationId(7)), "reservation:7");
        assert_eq!(RESERVATION_ID_SEQ_KEY, "reservation:id:seq");
        assert_eq!(
            showtime_remaining_key(ShowtimeId(3)),
            "showtime:3:ticket:remain"
        );
        assert_eq!(
            user_showtime_ordered_key(UserId(9), ShowtimeId(3)),
            "user:9:showtime:3:ordered"
        );
    }
}
