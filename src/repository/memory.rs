//! In-process store
//!
//! All state sits behind one async mutex, so every [`Store`] call is atomic
//! with respect to every other. Barbers, the service catalog and capacity
//! overrides are seeded through the `add_*` methods.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{LedgerRows, ScheduleSnapshot, Store};
use crate::{
    error::AppResult,
    models::{
        Admission, Barber, Booking, BookingStatus, CapacityOverride, NewBooking, NewQueueEntry,
        QueueEntry, QueueEstimate, QueueStatus, ServiceOffering, SlotCount,
    },
};

#[derive(Debug, Default)]
struct MemoryState {
    barbers: Vec<Barber>,
    offerings: Vec<ServiceOffering>,
    overrides: Vec<CapacityOverride>,
    bookings: Vec<Booking>,
    queue: Vec<QueueEntry>,
    last_join_seq: i64,
}

impl MemoryState {
    fn confirmed_in_slot(&self, date: NaiveDate, time: NaiveTime) -> usize {
        self.bookings
            .iter()
            .filter(|b| {
                b.appointment_date == date
                    && b.appointment_time == time
                    && b.status.holds_capacity()
            })
            .count()
    }

    fn active_override(&self, date: NaiveDate, time: NaiveTime) -> Option<&CapacityOverride> {
        self.overrides
            .iter()
            .find(|o| o.is_active && o.override_date == date && o.override_time == time)
    }

    fn active_queue(&self) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = self
            .queue
            .iter()
            .filter(|e| !e.status.is_terminal())
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.join_seq);
        entries
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a barber; ids are assigned from 1 upward
    pub async fn add_barber(&self, name: &str, is_active: bool) -> Barber {
        let mut state = self.state.lock().await;
        let barber = Barber {
            id: state.barbers.len() as i32 + 1,
            name: name.to_string(),
            is_active,
        };
        state.barbers.push(barber.clone());
        barber
    }

    /// Put a barber on or off shift
    pub async fn set_barber_active(&self, id: i32, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(barber) = state.barbers.iter_mut().find(|b| b.id == id) {
            barber.is_active = is_active;
        }
    }

    pub async fn add_offering(&self, name: &str, duration_minutes: i32) -> ServiceOffering {
        let mut state = self.state.lock().await;
        let offering = ServiceOffering {
            id: state.offerings.len() as i32 + 1,
            name: name.to_string(),
            duration_minutes,
            is_active: true,
        };
        state.offerings.push(offering.clone());
        offering
    }

    /// Set the capacity of one slot, replacing any earlier override for it
    pub async fn add_capacity_override(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        capacity: i32,
        is_active: bool,
    ) -> CapacityOverride {
        let mut state = self.state.lock().await;
        state
            .overrides
            .retain(|o| !(o.override_date == date && o.override_time == time));
        let capacity_override = CapacityOverride {
            id: state.overrides.iter().map(|o| o.id).max().unwrap_or(0) + 1,
            override_date: date,
            override_time: time,
            capacity,
            is_active,
            reason: None,
        };
        state.overrides.push(capacity_override.clone());
        capacity_override
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn active_barbers(&self) -> AppResult<Vec<Barber>> {
        let state = self.state.lock().await;
        Ok(state.barbers.iter().filter(|b| b.is_active).cloned().collect())
    }

    async fn get_offering(&self, id: i32) -> AppResult<Option<ServiceOffering>> {
        let state = self.state.lock().await;
        Ok(state.offerings.iter().find(|o| o.id == id).cloned())
    }

    async fn ledger_rows(&self, start: NaiveDate, end: NaiveDate) -> AppResult<LedgerRows> {
        let state = self.state.lock().await;

        let mut counts: HashMap<(NaiveDate, NaiveTime), i64> = HashMap::new();
        for booking in state.bookings.iter().filter(|b| {
            b.status.holds_capacity() && b.appointment_date >= start && b.appointment_date <= end
        }) {
            *counts
                .entry((booking.appointment_date, booking.appointment_time))
                .or_default() += 1;
        }

        let overrides = state
            .overrides
            .iter()
            .filter(|o| o.is_active && o.override_date >= start && o.override_date <= end)
            .cloned()
            .collect();

        Ok(LedgerRows {
            counts: counts
                .into_iter()
                .map(|((appointment_date, appointment_time), booked)| SlotCount {
                    appointment_date,
                    appointment_time,
                    booked,
                })
                .collect(),
            overrides,
        })
    }

    async fn admit_booking(
        &self,
        booking: NewBooking,
        nominal_capacity: i32,
    ) -> AppResult<Admission> {
        let mut state = self.state.lock().await;

        let capacity = state
            .active_override(booking.appointment_date, booking.appointment_time)
            .map(|o| o.capacity)
            .unwrap_or(nominal_capacity);
        let booked = state.confirmed_in_slot(booking.appointment_date, booking.appointment_time);
        if booked as i64 >= capacity as i64 {
            return Ok(Admission::Full {
                capacity,
                booked: i32::try_from(booked).unwrap_or(i32::MAX),
            });
        }

        let row = booking.into_booking(Uuid::new_v4());
        state.bookings.push(row.clone());
        Ok(Admission::Admitted(row))
    }

    async fn get_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings(&self, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.appointment_date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.appointment_time, b.crea_date, b.id));
        Ok(rows)
    }

    async fn transition_booking(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        let mut state = self.state.lock().await;
        Ok(state
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == from)
            .map(|booking| {
                booking.status = to;
                booking.modif_date = Some(at);
                booking.clone()
            }))
    }

    async fn schedule_snapshot(&self, date: NaiveDate) -> AppResult<ScheduleSnapshot> {
        let state = self.state.lock().await;

        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.appointment_date == date && b.status.holds_capacity())
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.appointment_time, b.id));

        Ok(ScheduleSnapshot {
            barbers: state.barbers.iter().filter(|b| b.is_active).cloned().collect(),
            bookings,
            queue: state.active_queue(),
        })
    }

    async fn insert_queue_entry(&self, entry: NewQueueEntry) -> AppResult<QueueEntry> {
        let mut state = self.state.lock().await;
        let waiting = state
            .queue
            .iter()
            .filter(|e| e.status == QueueStatus::Waiting)
            .count();
        state.last_join_seq += 1;
        let row = entry.into_entry(Uuid::new_v4(), state.last_join_seq, waiting as i32 + 1);
        state.queue.push(row.clone());
        Ok(row)
    }

    async fn get_queue_entry(&self, id: Uuid) -> AppResult<Option<QueueEntry>> {
        let state = self.state.lock().await;
        Ok(state.queue.iter().find(|e| e.id == id).cloned())
    }

    async fn active_queue(&self) -> AppResult<Vec<QueueEntry>> {
        let state = self.state.lock().await;
        Ok(state.active_queue())
    }

    async fn transition_queue_entry(
        &self,
        id: Uuid,
        from: QueueStatus,
        to: QueueStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<QueueEntry>> {
        let mut state = self.state.lock().await;
        Ok(state
            .queue
            .iter_mut()
            .find(|e| e.id == id && e.status == from)
            .map(|entry| {
                entry.status = to;
                entry.modif_date = Some(at);
                entry.position = None;
                entry.estimated_wait_minutes = None;
                if to == QueueStatus::InService {
                    entry.served_date = Some(at);
                }
                entry.clone()
            }))
    }

    async fn apply_queue_estimates(&self, estimates: Vec<QueueEstimate>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        for entry in state.queue.iter_mut() {
            let estimate = estimates
                .iter()
                .find(|e| e.id == entry.id)
                .filter(|_| entry.status == QueueStatus::Waiting);
            entry.position = estimate.map(|e| e.position);
            entry.estimated_wait_minutes = estimate.map(|e| e.estimated_wait_minutes);
        }
        Ok(())
    }
}
