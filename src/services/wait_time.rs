//! Wait-time service: loads one schedule snapshot and runs the simulator on it

use std::sync::Arc;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{AppResult, Rejection},
    models::{QueueEntry, QueueStatus, WaitTimeSummary},
    repository::{ScheduleSnapshot, Store},
    scheduling::{simulate, Appointment, BookingPolicy, Simulation, WalkIn},
};

#[derive(Clone)]
pub struct WaitTimeService {
    store: Arc<dyn Store>,
    policy: Arc<BookingPolicy>,
    clock: Arc<dyn Clock>,
}

impl WaitTimeService {
    pub fn new(store: Arc<dyn Store>, policy: Arc<BookingPolicy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// Simulate the rest of today from the current instant
    pub async fn simulate(&self) -> AppResult<Simulation> {
        let local_now = self.policy.local_now(self.clock.now());
        let snapshot = self.store.schedule_snapshot(local_now.date()).await?;
        Ok(self.run(local_now, &snapshot))
    }

    /// Wait the next arriving walk-in would face, in minutes
    pub async fn current_wait(&self) -> AppResult<i64> {
        Ok(self.simulate().await?.current_wait_minutes)
    }

    /// Estimated wait of a waiting entry
    pub async fn wait_for(&self, id: Uuid) -> AppResult<i64> {
        let simulation = self.simulate().await?;
        simulation
            .wait_for(id)
            .ok_or_else(|| Rejection::QueueEntryNotFound(id).into())
    }

    pub async fn summary(&self) -> AppResult<WaitTimeSummary> {
        Ok(self.simulate().await?.summary())
    }

    fn run(&self, local_now: NaiveDateTime, snapshot: &ScheduleSnapshot) -> Simulation {
        let appointments: Vec<Appointment> = snapshot.bookings.iter().map(Appointment::from).collect();
        let walk_ins: Vec<WalkIn> = snapshot
            .queue
            .iter()
            .filter_map(|entry| self.walk_in(entry, local_now))
            .collect();

        simulate(
            local_now,
            &snapshot.barbers,
            &appointments,
            &walk_ins,
            self.policy.default_service(),
        )
    }

    fn walk_in(&self, entry: &QueueEntry, local_now: NaiveDateTime) -> Option<WalkIn> {
        let in_service_since = match entry.status {
            QueueStatus::Waiting => None,
            // An entry without a start stamp is treated as just seated
            QueueStatus::InService => Some(
                entry
                    .served_date
                    .map(|served| self.policy.to_local(served))
                    .unwrap_or(local_now),
            ),
            _ => return None,
        };
        Some(WalkIn {
            id: entry.id,
            join_seq: entry.join_seq,
            barber_id: entry.barber_id,
            in_service_since,
        })
    }
}
