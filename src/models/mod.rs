//! Data models for Chairtime

pub mod barber;
pub mod booking;
pub mod capacity;
pub mod queue;

use once_cell::sync::Lazy;
use regex::Regex;

// Re-export commonly used types
pub use barber::{Barber, ServiceOffering};
pub use booking::{Admission, Booking, BookingStatus, CreateBooking, NewBooking};
pub use capacity::{CapacityOverride, DateAvailability, SlotAvailability, SlotCount};
pub use queue::{JoinQueue, NewQueueEntry, QueueEntry, QueueEstimate, QueueStatus, WaitTimeSummary};

/// Digits with optional leading "+", spaces, dots, dashes and parentheses
pub(crate) static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ().-]{5,19}$").expect("phone pattern is valid")
});

/// At least one visible character; names are stored trimmed
pub(crate) static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S").expect("name pattern is valid"));

/// Implements sqlx text encoding for a status enum with `as_str` and `FromStr`.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = sqlx::Decode::<sqlx::Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

pub(crate) use text_column;
