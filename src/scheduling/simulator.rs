//! Wait-time simulator
//!
//! Walks time forward from "now" over every active barber: appointments are
//! placed first, in start order, then the waiting walk-ins in join order.
//! Each barber carries a single free-at instant; whoever is free first (lowest
//! id on ties) takes the next customer unless the customer asked for someone.
//! The result is a pure function of its inputs.

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::models::{Barber, Booking, QueueEstimate, WaitTimeSummary};

/// Stand-in barber simulated when nobody is on shift
const VIRTUAL_BARBER_ID: i32 = 0;

/// A confirmed booking, in local time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub start: NaiveDateTime,
    pub duration: Duration,
    pub barber_id: Option<i32>,
}

impl From<&Booking> for Appointment {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            start: booking.starts_at(),
            duration: booking.duration(),
            barber_id: booking.barber_id,
        }
    }
}

/// A walk-in customer still in the shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkIn {
    pub id: Uuid,
    /// Join order; lower joined earlier
    pub join_seq: i64,
    pub barber_id: Option<i32>,
    /// Local time service started; `None` while waiting
    pub in_service_since: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub current_wait_minutes: i64,
    pub active_barber_count: usize,
    /// One estimate per waiting walk-in, in position order
    pub estimates: Vec<QueueEstimate>,
}

impl Simulation {
    pub fn wait_for(&self, id: Uuid) -> Option<i64> {
        self.estimates
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.estimated_wait_minutes as i64)
    }

    pub fn queue_length(&self) -> usize {
        self.estimates.len()
    }

    pub fn summary(&self) -> WaitTimeSummary {
        WaitTimeSummary {
            current_wait_minutes: self.current_wait_minutes,
            queue_length: self.queue_length(),
            active_barber_count: self.active_barber_count,
        }
    }
}

#[derive(Debug)]
struct Chair {
    barber_id: i32,
    free_at: NaiveDateTime,
}

/// The preferred barber if on shift, else the one free first
fn pick(chairs: &mut [Chair], preferred: Option<i32>) -> &mut Chair {
    let preferred_idx = preferred.and_then(|id| chairs.iter().position(|c| c.barber_id == id));
    let idx = preferred_idx.unwrap_or_else(|| {
        chairs
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| (c.free_at, c.barber_id))
            .map(|(i, _)| i)
            .unwrap_or(0)
    });
    &mut chairs[idx]
}

/// Whole minutes from `now` until `at`, rounded up, never negative
fn minutes_until(now: NaiveDateTime, at: NaiveDateTime) -> i64 {
    let seconds = (at - now).num_seconds();
    if seconds <= 0 {
        0
    } else {
        (seconds + 59) / 60
    }
}

pub fn simulate(
    now: NaiveDateTime,
    barbers: &[Barber],
    appointments: &[Appointment],
    walk_ins: &[WalkIn],
    default_service: Duration,
) -> Simulation {
    let mut chairs: Vec<Chair> = barbers
        .iter()
        .filter(|b| b.is_active)
        .map(|b| Chair {
            barber_id: b.id,
            free_at: now,
        })
        .collect();
    chairs.sort_by_key(|c| c.barber_id);
    chairs.dedup_by_key(|c| c.barber_id);
    let active_barber_count = chairs.len();
    if chairs.is_empty() {
        chairs.push(Chair {
            barber_id: VIRTUAL_BARBER_ID,
            free_at: now,
        });
    }

    // Walk-ins already in the chair
    let mut serving: Vec<(&WalkIn, NaiveDateTime)> = walk_ins
        .iter()
        .filter_map(|w| w.in_service_since.map(|since| (w, since)))
        .collect();
    serving.sort_by_key(|(w, since)| (*since, w.id));
    for (walk_in, since) in serving {
        let chair = pick(&mut chairs, walk_in.barber_id);
        chair.free_at = chair.free_at.max(since + default_service);
    }

    // Scheduled appointments not yet over
    let mut upcoming: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.start + a.duration > now)
        .collect();
    upcoming.sort_by_key(|a| (a.start, a.id));
    for appointment in upcoming {
        let chair = pick(&mut chairs, appointment.barber_id);
        chair.free_at = if appointment.start <= now {
            chair.free_at.max(appointment.start + appointment.duration)
        } else {
            chair.free_at.max(appointment.start) + appointment.duration
        };
    }

    // Waiting walk-ins, first come first served
    let mut waiting: Vec<&WalkIn> = walk_ins
        .iter()
        .filter(|w| w.in_service_since.is_none())
        .collect();
    waiting.sort_by_key(|w| w.join_seq);
    let estimates = waiting
        .into_iter()
        .enumerate()
        .map(|(idx, walk_in)| {
            let chair = pick(&mut chairs, walk_in.barber_id);
            let wait = minutes_until(now, chair.free_at);
            chair.free_at = chair.free_at.max(now) + default_service;
            QueueEstimate {
                id: walk_in.id,
                position: idx as i32 + 1,
                estimated_wait_minutes: i32::try_from(wait).unwrap_or(i32::MAX),
            }
        })
        .collect();

    let next_free = chairs.iter().map(|c| c.free_at).min().unwrap_or(now);

    Simulation {
        current_wait_minutes: minutes_until(now, next_free),
        active_barber_count,
        estimates,
    }
}
