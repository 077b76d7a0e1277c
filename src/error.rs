//! Error types for Chairtime server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Stable error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    InvalidDateFormat = 100,
    PastDate = 101,
    BeyondBookingWindow = 102,
    SlotFull = 103,
    InvalidTimeSlot = 104,
    InvalidStatusTransition = 105,
    QueueEntryNotFound = 106,
    NotFound = 107,
    ValidationError = 108,
    ConcurrentModification = 200,
    PersistenceUnavailable = 201,
    DatabaseError = 202,
    InternalError = 203,
}

impl ErrorCode {
    /// Machine-checkable kind, stable across releases
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ErrorCode::PastDate => "PAST_DATE",
            ErrorCode::BeyondBookingWindow => "BEYOND_BOOKING_WINDOW",
            ErrorCode::SlotFull => "SLOT_FULL",
            ErrorCode::InvalidTimeSlot => "INVALID_TIME_SLOT",
            ErrorCode::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            ErrorCode::QueueEntryNotFound => "QUEUE_ENTRY_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expected outcomes of a request that the caller has to deal with.
///
/// These are answers, not faults: they are never logged as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Invalid date or time format: {0}")]
    InvalidDateFormat(String),

    #[error("Date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("Slot {date} {time} has already started")]
    SlotStarted { date: NaiveDate, time: NaiveTime },

    #[error("Date {date} is beyond the booking window of {window_days} days")]
    BeyondBookingWindow { date: NaiveDate, window_days: i64 },

    #[error("Slot {date} {time} is full")]
    SlotFull { date: NaiveDate, time: NaiveTime },

    #[error("No bookable slot at {time} on {date}")]
    InvalidTimeSlot { date: NaiveDate, time: NaiveTime },

    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Queue entry {0} not found")]
    QueueEntryNotFound(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Rejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            Rejection::InvalidDateFormat(_) => ErrorCode::InvalidDateFormat,
            Rejection::PastDate(_) | Rejection::SlotStarted { .. } => ErrorCode::PastDate,
            Rejection::BeyondBookingWindow { .. } => ErrorCode::BeyondBookingWindow,
            Rejection::SlotFull { .. } => ErrorCode::SlotFull,
            Rejection::InvalidTimeSlot { .. } => ErrorCode::InvalidTimeSlot,
            Rejection::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            Rejection::QueueEntryNotFound(_) => ErrorCode::QueueEntryNotFound,
            Rejection::NotFound(_) => ErrorCode::NotFound,
            Rejection::Validation(_) => ErrorCode::ValidationError,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Rejection::InvalidDateFormat(_)
            | Rejection::InvalidTimeSlot { .. }
            | Rejection::Validation(_) => StatusCode::BAD_REQUEST,
            Rejection::PastDate(_)
            | Rejection::SlotStarted { .. }
            | Rejection::BeyondBookingWindow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Rejection::SlotFull { .. } | Rejection::InvalidStatusTransition { .. } => {
                StatusCode::CONFLICT
            }
            Rejection::QueueEntryNotFound(_) | Rejection::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Rejected(rejection) => rejection.code(),
            AppError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
            AppError::PersistenceUnavailable(_) => ErrorCode::PersistenceUnavailable,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Returns the rejection if this error is an expected outcome
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AppError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

// SQLSTATE codes raised by PostgreSQL under lock contention
const CONTENTION_STATES: [&str; 3] = ["40001", "40P01", "55P03"];

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let unavailable = matches!(
            err,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::WorkerCrashed
        );
        if unavailable {
            return AppError::PersistenceUnavailable(err.to_string());
        }

        let contention = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|state| CONTENTION_STATES.contains(&&*state))
            .unwrap_or(false);
        if contention {
            return AppError::ConcurrentModification(err.to_string());
        }

        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Rejected(Rejection::Validation(errors.to_string()))
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Rejected(rejection) => {
                tracing::debug!(kind = %code, "Request rejected: {}", rejection);
                (rejection.status(), rejection.to_string())
            }
            AppError::ConcurrentModification(msg) => {
                tracing::warn!("Concurrent modification: {}", msg);
                (
                    StatusCode::CONFLICT,
                    "The resource was modified concurrently, please retry".to_string(),
                )
            }
            AppError::PersistenceUnavailable(msg) => {
                tracing::warn!("Persistence unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is temporarily unavailable".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: code.as_str().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.code(), ErrorCode::PersistenceUnavailable);
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert!(err.rejection().is_none());
    }

    #[test]
    fn test_rejection_kinds() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 19).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        let full = AppError::from(Rejection::SlotFull { date, time });
        assert_eq!(full.code().as_str(), "SLOT_FULL");
        assert_eq!(full.to_string(), "Slot 2025-11-19 10:00:00 is full");

        let started = Rejection::SlotStarted { date, time };
        assert_eq!(started.code(), ErrorCode::PastDate);
        assert_eq!(started.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_response_status() {
        let response = AppError::ConcurrentModification("busy".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::PersistenceUnavailable("down".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response =
            AppError::from(Rejection::QueueEntryNotFound(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
