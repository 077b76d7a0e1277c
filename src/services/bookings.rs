//! Booking admission and administration

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use super::queue::QueueService;
use crate::{
    clock::Clock,
    error::{AppError, AppResult, Rejection},
    models::{Admission, Booking, BookingStatus, CreateBooking, NewBooking},
    repository::Store,
    scheduling::{parse_date, parse_time, BookingPolicy},
};

/// Bounds on an appointment's length, in minutes
const MIN_DURATION: i32 = 5;
const MAX_DURATION: i32 = 480;

/// Pause before retrying an admission that hit lock contention
const RETRY_BACKOFF_MS: u64 = 10;

#[derive(Clone)]
pub struct BookingsService {
    store: Arc<dyn Store>,
    policy: Arc<BookingPolicy>,
    clock: Arc<dyn Clock>,
    queue: QueueService,
}

impl BookingsService {
    pub fn new(
        store: Arc<dyn Store>,
        policy: Arc<BookingPolicy>,
        clock: Arc<dyn Clock>,
        queue: QueueService,
    ) -> Self {
        Self {
            store,
            policy,
            clock,
            queue,
        }
    }

    /// Validate a booking request and admit it against its slot's capacity.
    ///
    /// Checks run in a fixed order and the first failure is returned: format,
    /// past date, booking window, slot grid, customer fields, then capacity.
    pub async fn admit(&self, request: CreateBooking) -> AppResult<Booking> {
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;

        let local_now = self.policy.local_now(self.clock.now());
        let today = local_now.date();
        self.policy.check_window(date, today)?;

        if !self.policy.is_slot(time) || self.policy.is_closed(date) {
            return Err(Rejection::InvalidTimeSlot { date, time }.into());
        }
        if date.and_time(time) <= local_now {
            return Err(Rejection::SlotStarted { date, time }.into());
        }

        request.validate()?;
        let duration_minutes = self.resolve_duration(&request).await?;
        if !self.policy.fits_before_closing(time, duration_minutes) {
            return Err(Rejection::InvalidTimeSlot { date, time }.into());
        }
        if let Some(barber_id) = request.barber_id {
            let barbers = self.store.active_barbers().await?;
            if !barbers.iter().any(|b| b.id == barber_id) {
                return Err(Rejection::Validation(format!(
                    "Barber {} is not available",
                    barber_id
                ))
                .into());
            }
        }

        let booking = NewBooking {
            appointment_date: date,
            appointment_time: time,
            duration_minutes,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone,
            customer_email: request.customer_email,
            service_id: request.service_id,
            barber_id: request.barber_id,
            notes: request.notes,
            crea_date: self.clock.now(),
        };

        let admitted = self.admit_with_retry(booking).await?;
        tracing::info!(
            booking_id = %admitted.id,
            date = %date,
            time = %time.format("%H:%M"),
            duration_minutes,
            "Booking admitted"
        );

        if date == today {
            self.refresh_queue().await;
        }
        Ok(admitted)
    }

    /// Get a booking by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Booking> {
        self.store
            .get_booking(id)
            .await?
            .ok_or_else(|| Rejection::NotFound(format!("Booking {} not found", id)).into())
    }

    /// All bookings of a day, in slot order
    pub async fn list_for_date(&self, raw_date: &str) -> AppResult<Vec<Booking>> {
        let date = parse_date(raw_date)?;
        self.store.list_bookings(date).await
    }

    /// Move a confirmed booking to a final status, freeing its spot
    pub async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(Rejection::InvalidStatusTransition {
                from: current.status.to_string(),
                to: status.to_string(),
            }
            .into());
        }

        let updated = self
            .store
            .transition_booking(id, current.status, status, self.clock.now())
            .await?
            .ok_or_else(|| {
                AppError::ConcurrentModification(format!("Booking {} changed status", id))
            })?;

        tracing::info!(
            booking_id = %id,
            from = %current.status,
            to = %status,
            "Booking status changed"
        );

        if updated.appointment_date == self.today() {
            self.refresh_queue().await;
        }
        Ok(updated)
    }

    fn today(&self) -> NaiveDate {
        self.policy.today(self.clock.now())
    }

    /// Explicit duration, else the catalog service's, else the slot default
    async fn resolve_duration(&self, request: &CreateBooking) -> AppResult<i32> {
        let duration = match (request.duration_minutes, request.service_id) {
            (Some(minutes), _) => minutes,
            (None, Some(service_id)) => {
                let offering = self
                    .store
                    .get_offering(service_id)
                    .await?
                    .ok_or_else(|| Rejection::NotFound(format!("Service {} not found", service_id)))?;
                if !offering.is_active {
                    return Err(Rejection::Validation(format!(
                        "Service {} is not offered",
                        service_id
                    ))
                    .into());
                }
                offering.duration_minutes
            }
            (None, None) => self.policy.slot_duration_minutes(),
        };

        if !(MIN_DURATION..=MAX_DURATION).contains(&duration) {
            return Err(Rejection::Validation(format!(
                "Duration must be between {} and {} minutes",
                MIN_DURATION, MAX_DURATION
            ))
            .into());
        }
        Ok(duration)
    }

    async fn admit_with_retry(&self, booking: NewBooking) -> AppResult<Booking> {
        let attempts = self.policy.admission_attempts();
        let mut attempt = 1;
        loop {
            match self
                .store
                .admit_booking(booking.clone(), self.policy.slot_capacity())
                .await
            {
                Ok(Admission::Admitted(admitted)) => return Ok(admitted),
                Ok(Admission::Full { capacity, booked }) => {
                    tracing::debug!(
                        slot = %booking.slot_key(),
                        capacity,
                        booked,
                        "Slot full"
                    );
                    return Err(Rejection::SlotFull {
                        date: booking.appointment_date,
                        time: booking.appointment_time,
                    }
                    .into());
                }
                Err(AppError::ConcurrentModification(msg)) if attempt < attempts => {
                    tracing::warn!(
                        slot = %booking.slot_key(),
                        attempt,
                        "Admission hit lock contention, retrying: {}",
                        msg
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(
                        RETRY_BACKOFF_MS * attempt as u64,
                    ))
                    .await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // The booking is committed whatever happens here
    async fn refresh_queue(&self) {
        if let Err(e) = self.queue.recompute_positions().await {
            tracing::warn!("Queue recomputation after booking change failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        config::BookingConfig,
        error::ErrorCode,
        repository::MockStore,
        services::Services,
    };
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn bookings_at(store: MockStore, hour: u32, minute: u32) -> BookingsService {
        let policy = BookingPolicy::from_config(&BookingConfig::default()).unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 11, 19, hour, minute, 0).unwrap());
        Services::new(Arc::new(store), Arc::new(policy), Arc::new(clock)).bookings
    }

    fn bookings(store: MockStore) -> BookingsService {
        bookings_at(store, 8, 0)
    }

    fn request(date: &str, time: &str) -> CreateBooking {
        CreateBooking {
            date: date.to_string(),
            time: time.to_string(),
            duration_minutes: None,
            customer_name: "Jordan".to_string(),
            customer_phone: "0612345678".to_string(),
            customer_email: None,
            service_id: None,
            barber_id: None,
            notes: None,
        }
    }

    fn contention() -> AppError {
        AppError::ConcurrentModification("could not obtain lock".to_string())
    }

    #[tokio::test]
    async fn test_past_date_never_reaches_store() {
        // No expectations: any store call panics
        let service = bookings(MockStore::new());
        let err = service.admit(request("2025-11-18", "10:00")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PastDate);
    }

    #[tokio::test]
    async fn test_validation_order() {
        let service = bookings(MockStore::new());

        let err = service.admit(request("19-11-2025", "10:00")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidDateFormat);

        let err = service.admit(request("2026-03-01", "10:00")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::BeyondBookingWindow);

        let err = service.admit(request("2025-11-20", "10:15")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTimeSlot);

        // Before opening
        let err = service.admit(request("2025-11-19", "08:00")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTimeSlot);

        let mut bad_phone = request("2025-11-20", "10:00");
        bad_phone.customer_phone = "nope".to_string();
        let err = service.admit(bad_phone).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_started_slot_today_is_past() {
        let service = bookings_at(MockStore::new(), 10, 5);

        let mut started = request("2025-11-19", "10:00");
        started.customer_phone = "nope".to_string();
        let err = service.admit(started).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PastDate);
    }

    #[tokio::test]
    async fn test_retries_exhausted_on_contention() {
        let mut store = MockStore::new();
        store
            .expect_admit_booking()
            .times(3)
            .returning(|_, _| Err(contention()));

        let err = bookings(store)
            .admit(request("2025-11-20", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConcurrentModification);
    }

    #[tokio::test]
    async fn test_retry_then_admitted() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let mut store = MockStore::new();
        store
            .expect_admit_booking()
            .times(2)
            .returning(move |booking, capacity| {
                assert_eq!(capacity, 2);
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(contention())
                } else {
                    Ok(Admission::Admitted(booking.into_booking(Uuid::nil())))
                }
            });

        let booking = bookings(store)
            .admit(request("2025-11-20", "10:00"))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.duration_minutes, 30);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistence_fault_is_not_retried() {
        let mut store = MockStore::new();
        store
            .expect_admit_booking()
            .times(1)
            .returning(|_, _| Err(AppError::PersistenceUnavailable("pool timed out".to_string())));

        let err = bookings(store)
            .admit(request("2025-11-20", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PersistenceUnavailable);
    }

    #[tokio::test]
    async fn test_full_slot_rejected() {
        let mut store = MockStore::new();
        store
            .expect_admit_booking()
            .times(1)
            .returning(|_, _| Ok(Admission::Full { capacity: 2, booked: 2 }));

        let err = bookings(store)
            .admit(request("2025-11-20", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SlotFull);
    }

    #[tokio::test]
    async fn test_unknown_service_is_not_found() {
        let mut store = MockStore::new();
        store.expect_get_offering().times(1).returning(|_| Ok(None));

        let mut with_service = request("2025-11-20", "10:00");
        with_service.service_id = Some(7);
        let err = bookings(store).admit(with_service).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_final_status_cannot_change() {
        let mut store = MockStore::new();
        store.expect_get_booking().returning(|id| {
            let mut booking = NewBooking {
                appointment_date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
                appointment_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                duration_minutes: 30,
                customer_name: "Jordan".to_string(),
                customer_phone: "0612345678".to_string(),
                customer_email: None,
                service_id: None,
                barber_id: None,
                notes: None,
                crea_date: Utc.with_ymd_and_hms(2025, 11, 19, 7, 0, 0).unwrap(),
            }
            .into_booking(id);
            booking.status = BookingStatus::Cancelled;
            Ok(Some(booking))
        });

        let err = bookings(store)
            .update_status(Uuid::nil(), BookingStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);
    }
}
