//! Slot capacity and availability models

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// ---------------------------------------------------------------------------
// Ledger rows
// ---------------------------------------------------------------------------

/// Exception to the nominal capacity of one slot (holiday, reduced staff, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CapacityOverride {
    pub id: i32,
    pub override_date: NaiveDate,
    pub override_time: NaiveTime,
    /// Zero blocks the slot
    pub capacity: i32,
    pub is_active: bool,
    pub reason: Option<String>,
}

/// Confirmed bookings for one slot
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SlotCount {
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub booked: i64,
}

// ---------------------------------------------------------------------------
// Availability views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Full,
    /// Closed, already started, or too short for the requested service
    Blocked,
}

/// Availability of a single slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotAvailability {
    pub time: NaiveTime,
    pub booked_count: i32,
    pub effective_capacity: i32,
    pub available_spots: i32,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Available,
    FullyBooked,
    /// Past, closed, or outside the booking window
    Unavailable,
}

/// Availability summary of one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateAvailability {
    pub date: NaiveDate,
    pub total_available_spots: i32,
    pub total_capacity: i32,
    pub booked_count: i32,
    pub is_available: bool,
    pub status: DateStatus,
}

/// Query parameters for a date range
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityRangeQuery {
    /// First date (YYYY-MM-DD)
    pub start_date: String,
    /// Last date, inclusive (YYYY-MM-DD)
    pub end_date: String,
    /// Only count slots this service fits into
    pub service_id: Option<i32>,
}

/// Query parameters for a single date
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SlotAvailabilityQuery {
    /// Only count slots this service fits into
    pub service_id: Option<i32>,
}
