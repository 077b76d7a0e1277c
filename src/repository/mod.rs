//! Repository layer for database operations
//!
//! Services talk to storage through the [`Store`] trait. [`Repository`] is the
//! PostgreSQL implementation, [`memory::MemoryStore`] keeps everything in
//! process for tests and single-node demos.

pub mod barbers;
pub mod bookings;
pub mod capacity;
pub mod memory;
pub mod queue;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Admission, Barber, Booking, BookingStatus, CapacityOverride, NewBooking, NewQueueEntry,
        QueueEntry, QueueEstimate, QueueStatus, ServiceOffering, SlotCount,
    },
};

pub use memory::MemoryStore;

/// Confirmed-booking counts and overrides read at one instant
#[derive(Debug, Clone, Default)]
pub struct LedgerRows {
    pub counts: Vec<SlotCount>,
    pub overrides: Vec<CapacityOverride>,
}

/// Everything the wait-time simulator reads, taken at one instant
#[derive(Debug, Clone, Default)]
pub struct ScheduleSnapshot {
    pub barbers: Vec<Barber>,
    /// Confirmed bookings of the simulated day
    pub bookings: Vec<Booking>,
    /// Waiting and in-service entries
    pub queue: Vec<QueueEntry>,
}

/// Persistence consumed by the scheduling services.
///
/// Each method is atomic on its own. `admit_booking` must make the capacity
/// check and the insert one step with respect to other admissions for the
/// same slot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;

    async fn active_barbers(&self) -> AppResult<Vec<Barber>>;

    async fn get_offering(&self, id: i32) -> AppResult<Option<ServiceOffering>>;

    async fn ledger_rows(&self, start: NaiveDate, end: NaiveDate) -> AppResult<LedgerRows>;

    /// Inserts the booking as confirmed if its slot still has room
    async fn admit_booking(&self, booking: NewBooking, nominal_capacity: i32)
        -> AppResult<Admission>;

    async fn get_booking(&self, id: Uuid) -> AppResult<Option<Booking>>;

    async fn list_bookings(&self, date: NaiveDate) -> AppResult<Vec<Booking>>;

    /// Moves a booking from `from` to `to`; `None` if it is not in `from` (or missing)
    async fn transition_booking(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Booking>>;

    async fn schedule_snapshot(&self, date: NaiveDate) -> AppResult<ScheduleSnapshot>;

    /// Appends a waiting entry behind the last waiting one
    async fn insert_queue_entry(&self, entry: NewQueueEntry) -> AppResult<QueueEntry>;

    async fn get_queue_entry(&self, id: Uuid) -> AppResult<Option<QueueEntry>>;

    /// Waiting and in-service entries in join order
    async fn active_queue(&self) -> AppResult<Vec<QueueEntry>>;

    /// Moves an entry from `from` to `to`; `None` if it is not in `from` (or missing)
    async fn transition_queue_entry(
        &self,
        id: Uuid,
        from: QueueStatus,
        to: QueueStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<QueueEntry>>;

    /// Writes positions and waits of waiting entries, clearing them on all others
    async fn apply_queue_estimates(&self, estimates: Vec<QueueEstimate>) -> AppResult<()>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn active_barbers(&self) -> AppResult<Vec<Barber>> {
        self.barbers_list_active().await
    }

    async fn get_offering(&self, id: i32) -> AppResult<Option<ServiceOffering>> {
        self.barbers_get_offering(id).await
    }

    async fn ledger_rows(&self, start: NaiveDate, end: NaiveDate) -> AppResult<LedgerRows> {
        self.capacity_ledger_rows(start, end).await
    }

    async fn admit_booking(
        &self,
        booking: NewBooking,
        nominal_capacity: i32,
    ) -> AppResult<Admission> {
        self.bookings_admit(booking, nominal_capacity).await
    }

    async fn get_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        self.bookings_get(id).await
    }

    async fn list_bookings(&self, date: NaiveDate) -> AppResult<Vec<Booking>> {
        self.bookings_list_for_date(date).await
    }

    async fn transition_booking(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        self.bookings_transition(id, from, to, at).await
    }

    async fn schedule_snapshot(&self, date: NaiveDate) -> AppResult<ScheduleSnapshot> {
        self.queue_schedule_snapshot(date).await
    }

    async fn insert_queue_entry(&self, entry: NewQueueEntry) -> AppResult<QueueEntry> {
        self.queue_insert(entry).await
    }

    async fn get_queue_entry(&self, id: Uuid) -> AppResult<Option<QueueEntry>> {
        self.queue_get(id).await
    }

    async fn active_queue(&self) -> AppResult<Vec<QueueEntry>> {
        self.queue_list_active().await
    }

    async fn transition_queue_entry(
        &self,
        id: Uuid,
        from: QueueStatus,
        to: QueueStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<QueueEntry>> {
        self.queue_transition(id, from, to, at).await
    }

    async fn apply_queue_estimates(&self, estimates: Vec<QueueEstimate>) -> AppResult<()> {
        self.queue_apply_estimates(estimates).await
    }
}
