//! Time-slot capacity ledger
//!
//! Derives effective capacity, booked count and available spots per
//! (date, time) slot from one consistent read of confirmed-booking counts and
//! capacity overrides. Nothing here touches storage.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::models::{CapacityOverride, SlotCount};

type SlotKey = (NaiveDate, NaiveTime);

/// Capacity that applies to a slot given its override, if any
pub fn effective_capacity(nominal: i32, slot_override: Option<&CapacityOverride>) -> i32 {
    match slot_override {
        Some(o) if o.is_active => o.capacity,
        _ => nominal,
    }
}

#[derive(Debug, Clone)]
pub struct CapacityLedger {
    nominal_capacity: i32,
    booked: HashMap<SlotKey, i32>,
    overrides: HashMap<SlotKey, i32>,
}

impl CapacityLedger {
    pub fn new(
        nominal_capacity: i32,
        counts: impl IntoIterator<Item = SlotCount>,
        overrides: impl IntoIterator<Item = CapacityOverride>,
    ) -> Self {
        let booked = counts
            .into_iter()
            .map(|c| {
                let count = i32::try_from(c.booked).unwrap_or(i32::MAX);
                ((c.appointment_date, c.appointment_time), count)
            })
            .collect();
        let overrides = overrides
            .into_iter()
            .filter(|o| o.is_active)
            .map(|o| ((o.override_date, o.override_time), o.capacity))
            .collect();

        Self {
            nominal_capacity,
            booked,
            overrides,
        }
    }

    pub fn effective_capacity(&self, date: NaiveDate, time: NaiveTime) -> i32 {
        self.overrides
            .get(&(date, time))
            .copied()
            .unwrap_or(self.nominal_capacity)
    }

    /// Confirmed bookings only
    pub fn booked_count(&self, date: NaiveDate, time: NaiveTime) -> i32 {
        self.booked.get(&(date, time)).copied().unwrap_or(0)
    }

    pub fn available_spots(&self, date: NaiveDate, time: NaiveTime) -> i32 {
        (self.effective_capacity(date, time) - self.booked_count(date, time)).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> SlotKey {
        (
            NaiveDate::from_ymd_opt(2025, 11, 19).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    fn count(booked: i64) -> SlotCount {
        let (appointment_date, appointment_time) = slot();
        SlotCount {
            appointment_date,
            appointment_time,
            booked,
        }
    }

    fn capacity_override(capacity: i32, is_active: bool) -> CapacityOverride {
        let (override_date, override_time) = slot();
        CapacityOverride {
            id: 1,
            override_date,
            override_time,
            capacity,
            is_active,
            reason: Some("Reduced staff".to_string()),
        }
    }

    #[test]
    fn test_nominal_capacity() {
        let (date, time) = slot();
        let ledger = CapacityLedger::new(2, vec![count(1)], vec![]);

        assert_eq!(ledger.effective_capacity(date, time), 2);
        assert_eq!(ledger.booked_count(date, time), 1);
        assert_eq!(ledger.available_spots(date, time), 1);

        let other = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(ledger.booked_count(date, other), 0);
        assert_eq!(ledger.available_spots(date, other), 2);
    }

    #[test]
    fn test_active_override_wins() {
        let (date, time) = slot();
        let ledger = CapacityLedger::new(2, vec![count(1)], vec![capacity_override(4, true)]);
        assert_eq!(ledger.effective_capacity(date, time), 4);
        assert_eq!(ledger.available_spots(date, time), 3);

        let ledger = CapacityLedger::new(2, vec![count(1)], vec![capacity_override(4, false)]);
        assert_eq!(ledger.effective_capacity(date, time), 2);
    }

    #[test]
    fn test_available_spots_never_negative() {
        // Capacity lowered below what is already booked
        let (date, time) = slot();
        let ledger = CapacityLedger::new(2, vec![count(2)], vec![capacity_override(1, true)]);
        assert_eq!(ledger.available_spots(date, time), 0);
    }

    #[test]
    fn test_effective_capacity_helper() {
        assert_eq!(effective_capacity(3, None), 3);
        assert_eq!(effective_capacity(3, Some(&capacity_override(0, true))), 0);
        assert_eq!(effective_capacity(3, Some(&capacity_override(0, false))), 3);
    }
}
