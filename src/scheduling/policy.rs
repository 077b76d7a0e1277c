//! Booking policy: slot grid, booking window and the salon's local time

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday,
};
use config::ConfigError;

use crate::{config::BookingConfig, error::Rejection};

/// Where a date falls relative to the booking window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Past,
    Open,
    Beyond,
}

#[derive(Debug, Clone)]
pub struct BookingPolicy {
    offset: FixedOffset,
    window_days: i64,
    slots: Vec<NaiveTime>,
    closing_time: NaiveTime,
    closed_weekdays: Vec<Weekday>,
    slot_capacity: i32,
    slot_duration_minutes: i32,
    default_service: Duration,
    admission_attempts: u32,
}

impl BookingPolicy {
    pub fn from_config(config: &BookingConfig) -> Result<Self, ConfigError> {
        let invalid = |msg: String| ConfigError::Message(format!("booking: {}", msg));

        let opening = NaiveTime::parse_from_str(&config.opening_time, "%H:%M")
            .map_err(|_| invalid(format!("invalid opening_time '{}'", config.opening_time)))?;
        let closing = NaiveTime::parse_from_str(&config.closing_time, "%H:%M")
            .map_err(|_| invalid(format!("invalid closing_time '{}'", config.closing_time)))?;
        if closing <= opening {
            return Err(invalid("closing_time must be after opening_time".to_string()));
        }
        if config.slot_interval_minutes <= 0 {
            return Err(invalid("slot_interval_minutes must be positive".to_string()));
        }
        if config.slot_capacity < 0 {
            return Err(invalid("slot_capacity cannot be negative".to_string()));
        }
        if config.booking_window_days < 0 {
            return Err(invalid("booking_window_days cannot be negative".to_string()));
        }
        if config.slot_duration_minutes <= 0 || config.default_service_minutes <= 0 {
            return Err(invalid("durations must be positive".to_string()));
        }
        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| invalid(format!("invalid utc_offset_minutes {}", config.utc_offset_minutes)))?;
        let closed_weekdays = config
            .closed_weekdays
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| invalid(format!("invalid weekday '{}'", day)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            offset,
            window_days: config.booking_window_days,
            slots: slot_grid(opening, closing, Duration::minutes(config.slot_interval_minutes)),
            closing_time: closing,
            closed_weekdays,
            slot_capacity: config.slot_capacity,
            slot_duration_minutes: config.slot_duration_minutes,
            default_service: Duration::minutes(config.default_service_minutes),
            admission_attempts: config.admission_attempts.max(1),
        })
    }

    // ---- Local time ----

    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        self.to_local(now)
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.to_local(now).date()
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    // ---- Booking window ----

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    pub fn last_bookable_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.window_days)
    }

    pub fn window_position(&self, date: NaiveDate, today: NaiveDate) -> WindowPosition {
        if date < today {
            WindowPosition::Past
        } else if date > self.last_bookable_date(today) {
            WindowPosition::Beyond
        } else {
            WindowPosition::Open
        }
    }

    /// Rejects a date outside `[today, today + window]`
    pub fn check_window(&self, date: NaiveDate, today: NaiveDate) -> Result<(), Rejection> {
        match self.window_position(date, today) {
            WindowPosition::Past => Err(Rejection::PastDate(date)),
            WindowPosition::Beyond => Err(Rejection::BeyondBookingWindow {
                date,
                window_days: self.window_days,
            }),
            WindowPosition::Open => Ok(()),
        }
    }

    // ---- Slots ----

    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    pub fn is_slot(&self, time: NaiveTime) -> bool {
        self.slots.binary_search(&time).is_ok()
    }

    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.closed_weekdays.contains(&date.weekday())
    }

    /// Whether an appointment of `minutes` starting at `time` ends by closing time
    pub fn fits_before_closing(&self, time: NaiveTime, minutes: i32) -> bool {
        let (end, overflow) = time.overflowing_add_signed(Duration::minutes(minutes as i64));
        overflow == 0 && end <= self.closing_time
    }

    pub fn slot_capacity(&self) -> i32 {
        self.slot_capacity
    }

    pub fn slot_duration_minutes(&self) -> i32 {
        self.slot_duration_minutes
    }

    pub fn default_service(&self) -> Duration {
        self.default_service
    }

    pub fn admission_attempts(&self) -> u32 {
        self.admission_attempts
    }
}

/// Slot start times from `opening` (inclusive) to `closing` (exclusive)
pub fn slot_grid(opening: NaiveTime, closing: NaiveTime, interval: Duration) -> Vec<NaiveTime> {
    let mut slots = Vec::new();
    let mut current = opening;
    while current < closing {
        slots.push(current);
        let (next, overflow) = current.overflowing_add_signed(interval);
        if overflow != 0 {
            break;
        }
        current = next;
    }
    slots
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate, Rejection> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Rejection::InvalidDateFormat(format!("'{}' is not a YYYY-MM-DD date", raw)))
}

/// Parse an `HH:MM` or `HH:MM:SS` time
pub fn parse_time(raw: &str) -> Result<NaiveTime, Rejection> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map_err(|_| Rejection::InvalidDateFormat(format!("'{}' is not an HH:MM time", raw)))
}
