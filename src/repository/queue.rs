//! Walk-in queue domain methods on Repository

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{Repository, ScheduleSnapshot};
use crate::{
    error::AppResult,
    models::{Barber, Booking, NewQueueEntry, QueueEntry, QueueEstimate, QueueStatus},
};

/// Advisory lock key serializing position writes across server instances
const QUEUE_LOCK_KEY: &str = "walk_in_queue";

impl Repository {
    /// Append a waiting entry with the next position
    pub async fn queue_insert(&self, entry: NewQueueEntry) -> AppResult<QueueEntry> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(QUEUE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, QueueEntry>(
            r#"
            INSERT INTO walk_in_queue (id, customer_name, customer_phone, barber_id, status, position, crea_date)
            VALUES (
                $1, $2, $3, $4, 'waiting',
                (SELECT (COUNT(*) + 1)::int4 FROM walk_in_queue WHERE status = 'waiting'),
                $5
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.customer_name)
        .bind(&entry.customer_phone)
        .bind(entry.barber_id)
        .bind(entry.crea_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Get a queue entry by ID
    pub async fn queue_get(&self, id: Uuid) -> AppResult<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, QueueEntry>("SELECT * FROM walk_in_queue WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Waiting and in-service entries in join order
    pub async fn queue_list_active(&self) -> AppResult<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<_, QueueEntry>(
            r#"
            SELECT * FROM walk_in_queue
            WHERE status IN ('waiting', 'in_service')
            ORDER BY join_seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Compare-and-set on the entry status.
    ///
    /// Every allowed move leaves `waiting`, so the rank is cleared here and
    /// entering service stamps `served_date`.
    pub async fn queue_transition(
        &self,
        id: Uuid,
        from: QueueStatus,
        to: QueueStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, QueueEntry>(
            r#"
            UPDATE walk_in_queue SET
                status = $3,
                modif_date = $4,
                position = NULL,
                estimated_wait_minutes = NULL,
                served_date = CASE WHEN $3 = 'in_service' THEN $4 ELSE served_date END
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

    /// Rewrite positions and estimates in one transaction
    pub async fn queue_apply_estimates(&self, estimates: Vec<QueueEstimate>) -> AppResult<()> {
        let ids: Vec<Uuid> = estimates.iter().map(|e| e.id).collect();
        let positions: Vec<i32> = estimates.iter().map(|e| e.position).collect();
        let waits: Vec<i32> = estimates.iter().map(|e| e.estimated_wait_minutes).collect();

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(QUEUE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE walk_in_queue SET position = NULL, estimated_wait_minutes = NULL
            WHERE position IS NOT NULL AND NOT (id = ANY($1))
            "#,
        )
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE walk_in_queue q SET
                position = e.position,
                estimated_wait_minutes = e.wait
            FROM UNNEST($1::uuid[], $2::int4[], $3::int4[]) AS e(id, position, wait)
            WHERE q.id = e.id AND q.status = 'waiting'
            "#,
        )
        .bind(&ids)
        .bind(&positions)
        .bind(&waits)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Barbers, the day's confirmed bookings and the active queue, from one snapshot
    pub async fn queue_schedule_snapshot(&self, date: NaiveDate) -> AppResult<ScheduleSnapshot> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let barbers = sqlx::query_as::<_, Barber>(
            "SELECT id, name, is_active FROM barbers WHERE is_active ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE appointment_date = $1 AND status = 'confirmed'
            ORDER BY appointment_time, id
            "#,
        )
        .bind(date)
        .fetch_all(&mut *tx)
        .await?;

        let queue = sqlx::query_as::<_, QueueEntry>(
            r#"
            SELECT * FROM walk_in_queue
            WHERE status IN ('waiting', 'in_service')
            ORDER BY join_seq
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ScheduleSnapshot {
            barbers,
            bookings,
            queue,
        })
    }
}
