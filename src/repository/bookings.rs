//! Bookings domain methods on Repository

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::AppResult,
    models::{Admission, Booking, BookingStatus, NewBooking},
};

impl Repository {
    /// Capacity check and insert under a transaction-scoped lock on the slot.
    ///
    /// Concurrent admissions for the same slot queue up on the advisory lock,
    /// so each one counts the bookings committed before it.
    pub async fn bookings_admit(
        &self,
        booking: NewBooking,
        nominal_capacity: i32,
    ) -> AppResult<Admission> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(booking.slot_key())
            .execute(&mut *tx)
            .await?;

        let override_capacity: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT capacity FROM capacity_overrides
            WHERE override_date = $1 AND override_time = $2 AND is_active
            "#,
        )
        .bind(booking.appointment_date)
        .bind(booking.appointment_time)
        .fetch_optional(&mut *tx)
        .await?;
        let capacity = override_capacity.unwrap_or(nominal_capacity);

        let booked: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE appointment_date = $1 AND appointment_time = $2 AND status = 'confirmed'
            "#,
        )
        .bind(booking.appointment_date)
        .bind(booking.appointment_time)
        .fetch_one(&mut *tx)
        .await?;

        if booked >= capacity as i64 {
            tx.rollback().await?;
            return Ok(Admission::Full {
                capacity,
                booked: i32::try_from(booked).unwrap_or(i32::MAX),
            });
        }

        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, customer_name, customer_phone, customer_email, service_id,
                appointment_date, appointment_time, duration_minutes, status,
                barber_id, notes, crea_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&booking.customer_name)
        .bind(&booking.customer_phone)
        .bind(&booking.customer_email)
        .bind(booking.service_id)
        .bind(booking.appointment_date)
        .bind(booking.appointment_time)
        .bind(booking.duration_minutes)
        .bind(BookingStatus::Confirmed)
        .bind(booking.barber_id)
        .bind(&booking.notes)
        .bind(booking.crea_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Admission::Admitted(row))
    }

    /// Get a booking by ID
    pub async fn bookings_get(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// All bookings of a day, any status
    pub async fn bookings_list_for_date(&self, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE appointment_date = $1 ORDER BY appointment_time, crea_date, id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Compare-and-set on the booking status
    pub async fn bookings_transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = $3, modif_date = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
