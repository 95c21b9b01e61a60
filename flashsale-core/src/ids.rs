//! Strongly-typed identifiers.
//!
//! Showtime, user, and reservation ids are all dense positive integers in
//! the original system (gorm auto-increment / redis `INCR`), so we wrap
//! `u64` rather than reach for `Uuid`. The newtypes exist purely to stop a
//! showtime id and a user id from being swapped at a call site.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the wrapped integer.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(ShowtimeId);
id_newtype!(UserId);
id_newtype!(ReservationId);
