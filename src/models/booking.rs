//! Booking (scheduled appointment) model and related types

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{NAME_REGEX, PHONE_REGEX};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::NoShow => "no_show",
        }
    }

    /// Only confirmed bookings hold a spot in their slot
    pub fn holds_capacity(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Every status other than `confirmed` is final.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        *self == BookingStatus::Confirmed && next != BookingStatus::Confirmed
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            "no_show" => Ok(BookingStatus::NoShow),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

super::text_column!(BookingStatus);

/// Booking row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    /// Catalog service, if one was chosen
    pub service_id: Option<i32>,
    pub appointment_date: NaiveDate,
    /// Slot start time
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    /// Requested barber, `None` for "any barber"
    pub barber_id: Option<i32>,
    pub notes: Option<String>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Booking {
    /// Local start of the appointment
    pub fn starts_at(&self) -> NaiveDateTime {
        self.appointment_date.and_time(self.appointment_time)
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }
}

/// Validated booking ready to be admitted against its slot
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: Option<i32>,
    pub barber_id: Option<i32>,
    pub notes: Option<String>,
    pub crea_date: DateTime<Utc>,
}

impl NewBooking {
    /// Lock key for the slot this booking competes for
    pub fn slot_key(&self) -> String {
        format!(
            "slot:{}T{}",
            self.appointment_date,
            self.appointment_time.format("%H:%M")
        )
    }

    pub fn into_booking(self, id: Uuid) -> Booking {
        Booking {
            id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            service_id: self.service_id,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            duration_minutes: self.duration_minutes,
            status: BookingStatus::Confirmed,
            barber_id: self.barber_id,
            notes: self.notes,
            crea_date: self.crea_date,
            modif_date: None,
        }
    }
}

/// Outcome of an atomic capacity check and insert
#[derive(Debug, Clone)]
pub enum Admission {
    Admitted(Booking),
    Full { capacity: i32, booked: i32 },
}

/// Create booking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    /// Appointment date (YYYY-MM-DD)
    pub date: String,
    /// Slot start time (HH:MM)
    pub time: String,
    /// Appointment length; defaults to the service's duration
    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    pub duration_minutes: Option<i32>,
    #[validate(
        length(min = 1, max = 100, message = "Customer name must be 1-100 characters"),
        regex(path = *NAME_REGEX, message = "Customer name must not be blank")
    )]
    pub customer_name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub customer_phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: Option<String>,
    pub service_id: Option<i32>,
    /// Preferred barber; omit for any barber
    pub barber_id: Option<i32>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Booking status change (admin)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookingQuery {
    /// Day to list (YYYY-MM-DD)
    pub date: String,
}
