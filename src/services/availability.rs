//! Availability views over the capacity ledger (read-only)

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    clock::Clock,
    error::{AppResult, Rejection},
    models::{
        capacity::{DateStatus, SlotStatus},
        DateAvailability, SlotAvailability,
    },
    repository::Store,
    scheduling::{parse_date, BookingPolicy, CapacityLedger, WindowPosition},
};

/// Longest range served by one calendar request, in days
pub const MAX_RANGE_DAYS: i64 = 92;

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn Store>,
    policy: Arc<BookingPolicy>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn Store>, policy: Arc<BookingPolicy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// Per-date summary for every date of `[start, end]`
    pub async fn range_availability(
        &self,
        raw_start: &str,
        raw_end: &str,
        service_id: Option<i32>,
    ) -> AppResult<Vec<DateAvailability>> {
        let start = parse_date(raw_start)?;
        let end = parse_date(raw_end)?;
        if end < start {
            return Err(Rejection::Validation("end_date must not be before start_date".into()).into());
        }
        let span = (end - start).num_days() + 1;
        if span > MAX_RANGE_DAYS {
            return Err(Rejection::Validation(format!(
                "Date range spans {} days, at most {} allowed",
                span, MAX_RANGE_DAYS
            ))
            .into());
        }

        let minutes = self.service_minutes(service_id).await?;
        let rows = self.store.ledger_rows(start, end).await?;
        let ledger = CapacityLedger::new(self.policy.slot_capacity(), rows.counts, rows.overrides);
        let local_now = self.policy.local_now(self.clock.now());

        Ok(start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| self.date_view(&ledger, date, local_now, minutes))
            .collect())
    }

    /// Every configured slot of one date
    pub async fn slot_availability(
        &self,
        raw_date: &str,
        service_id: Option<i32>,
    ) -> AppResult<Vec<SlotAvailability>> {
        let date = parse_date(raw_date)?;
        let local_now = self.policy.local_now(self.clock.now());
        self.policy.check_window(date, local_now.date())?;

        let minutes = self.service_minutes(service_id).await?;
        let rows = self.store.ledger_rows(date, date).await?;
        let ledger = CapacityLedger::new(self.policy.slot_capacity(), rows.counts, rows.overrides);

        Ok(self
            .policy
            .slots()
            .iter()
            .map(|time| self.slot_view(&ledger, date, *time, local_now, minutes))
            .collect())
    }

    /// Length a slot must accommodate: the service's, else the default booking length
    async fn service_minutes(&self, service_id: Option<i32>) -> AppResult<i32> {
        let Some(id) = service_id else {
            return Ok(self.policy.slot_duration_minutes());
        };
        match self.store.get_offering(id).await? {
            Some(offering) if offering.is_active => Ok(offering.duration_minutes),
            Some(_) => Err(Rejection::Validation(format!("Service {} is not offered", id)).into()),
            None => Err(Rejection::NotFound(format!("Service {} not found", id)).into()),
        }
    }

    fn slot_view(
        &self,
        ledger: &CapacityLedger,
        date: NaiveDate,
        time: NaiveTime,
        local_now: NaiveDateTime,
        minutes: i32,
    ) -> SlotAvailability {
        let effective_capacity = ledger.effective_capacity(date, time);
        let booked_count = ledger.booked_count(date, time);
        let blocked = effective_capacity == 0
            || self.policy.is_closed(date)
            || date.and_time(time) <= local_now
            || !self.policy.fits_before_closing(time, minutes);

        let available_spots = if blocked {
            0
        } else {
            ledger.available_spots(date, time)
        };
        let status = if blocked {
            SlotStatus::Blocked
        } else if available_spots == 0 {
            SlotStatus::Full
        } else {
            SlotStatus::Available
        };

        SlotAvailability {
            time,
            booked_count,
            effective_capacity,
            available_spots,
            status,
        }
    }

    fn date_view(
        &self,
        ledger: &CapacityLedger,
        date: NaiveDate,
        local_now: NaiveDateTime,
        minutes: i32,
    ) -> DateAvailability {
        let in_window =
            self.policy.window_position(date, local_now.date()) == WindowPosition::Open;
        let slots: Vec<SlotAvailability> = self
            .policy
            .slots()
            .iter()
            .map(|time| self.slot_view(ledger, date, *time, local_now, minutes))
            .collect();

        let usable: Vec<&SlotAvailability> = slots
            .iter()
            .filter(|s| s.status != SlotStatus::Blocked)
            .collect();
        let total_available_spots: i32 = usable.iter().map(|s| s.available_spots).sum();
        let total_capacity: i32 = usable.iter().map(|s| s.effective_capacity).sum();
        let booked_count: i32 = slots.iter().map(|s| s.booked_count).sum();

        let status = if !in_window || usable.is_empty() {
            DateStatus::Unavailable
        } else if total_available_spots == 0 {
            DateStatus::FullyBooked
        } else {
            DateStatus::Available
        };

        DateAvailability {
            date,
            total_available_spots,
            total_capacity,
            booked_count,
            is_available: status == DateStatus::Available,
            status,
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
        models::{CapacityOverride, SlotCount},
        repository::{LedgerRows, MockStore},
    };
    use chrono::{TimeZone, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn service(store: MockStore, config: BookingConfig) -> AvailabilityService {
        let policy = BookingPolicy::from_config(&config).unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 11, 19, 12, 10, 0).unwrap());
        AvailabilityService::new(Arc::new(store), Arc::new(policy), Arc::new(clock))
    }

    fn short_day() -> BookingConfig {
        BookingConfig {
            opening_time: "10:00".to_string(),
            closing_time: "11:00".to_string(),
            ..BookingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_slot_statuses() {
        let mut store = MockStore::new();
        store.expect_ledger_rows().times(1).returning(|start, _| {
            Ok(LedgerRows {
                counts: vec![SlotCount {
                    appointment_date: start,
                    appointment_time: time(10, 0),
                    booked: 2,
                }],
                overrides: vec![CapacityOverride {
                    id: 1,
                    override_date: start,
                    override_time: time(10, 30),
                    capacity: 0,
                    is_active: true,
                    reason: Some("Training".to_string()),
                }],
            })
        });

        let slots = service(store, short_day())
            .slot_availability("2025-11-20", None)
            .await
            .unwrap();
        let statuses: Vec<SlotStatus> = slots.iter().map(|s| s.status).collect();
        assert_eq!(statuses, vec![SlotStatus::Full, SlotStatus::Blocked]);
        assert_eq!(slots[0].available_spots, 0);
        assert_eq!(slots[1].effective_capacity, 0);
    }

    #[tokio::test]
    async fn test_fully_booked_only_when_every_slot_full() {
        let mut store = MockStore::new();
        store.expect_ledger_rows().times(1).returning(|_, _| {
            let full = |d, h, m| SlotCount {
                appointment_date: date(d),
                appointment_time: time(h, m),
                booked: 2,
            };
            Ok(LedgerRows {
                counts: vec![full(20, 10, 0), full(20, 10, 30), full(21, 10, 0)],
                overrides: Vec::new(),
            })
        });

        let days = service(store, short_day())
            .range_availability("2025-11-18", "2025-11-21", None)
            .await
            .unwrap();
        let statuses: Vec<DateStatus> = days.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![
                DateStatus::Unavailable, // past
                DateStatus::Unavailable, // today, after the last slot
                DateStatus::FullyBooked,
                DateStatus::Available,
            ]
        );
        assert_eq!(days[3].total_available_spots, 2);
        assert_eq!(days[3].total_capacity, 4);
        assert_eq!(days[3].booked_count, 2);
        assert!(days[3].is_available);
    }

    #[tokio::test]
    async fn test_range_limits() {
        let service = service(MockStore::new(), BookingConfig::default());

        let err = service
            .range_availability("2025-11-21", "2025-11-20", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err = service
            .range_availability("2025-11-20", "2026-02-21", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err = service.slot_availability("2025-11-18", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PastDate);
    }

    #[tokio::test]
    async fn test_long_service_blocks_late_slots() {
        let mut store = MockStore::new();
        store.expect_get_offering().returning(|id| {
            Ok(Some(crate::models::ServiceOffering {
                id,
                name: "Colour".to_string(),
                duration_minutes: 45,
                is_active: true,
            }))
        });
        store
            .expect_ledger_rows()
            .returning(|_, _| Ok(LedgerRows::default()));

        let slots = service(store, short_day())
            .slot_availability("2025-11-20", Some(3))
            .await
            .unwrap();
        assert_eq!(slots[0].status, SlotStatus::Available);
        assert_eq!(slots[1].status, SlotStatus::Blocked);
    }
}
