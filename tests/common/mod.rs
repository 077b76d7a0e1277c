//! Shared fixtures: services over the in-memory store and a frozen clock

#![allow(dead_code)]

use std::sync::Arc;

use chairtime_server::{
    clock::{Clock, FixedClock},
    config::BookingConfig,
    models::{CreateBooking, JoinQueue},
    repository::MemoryStore,
    scheduling::BookingPolicy,
    services::Services,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub struct Harness {
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
    pub services: Services,
}

/// Wednesday 2025-11-19 at `hour:minute` UTC
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 19, hour, minute, 0).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 19).unwrap()
}

/// Services over an empty store with `barbers` barbers on shift, clock at 08:00
pub async fn harness(config: BookingConfig, barbers: usize) -> Harness {
    let store = MemoryStore::new();
    for n in 1..=barbers {
        store.add_barber(&format!("Barber {}", n), true).await;
    }

    let clock = Arc::new(FixedClock::new(at(8, 0)));
    let policy = BookingPolicy::from_config(&config).unwrap();
    let shared_clock: Arc<dyn Clock> = clock.clone();
    let services = Services::new(Arc::new(store.clone()), Arc::new(policy), shared_clock);

    Harness {
        store,
        clock,
        services,
    }
}

pub fn booking_request(date: &str, time: &str) -> CreateBooking {
    CreateBooking {
        date: date.to_string(),
        time: time.to_string(),
        duration_minutes: None,
        customer_name: "Robin".to_string(),
        customer_phone: "+33 6 12 34 56 78".to_string(),
        customer_email: Some("robin@example.com".to_string()),
        service_id: None,
        barber_id: None,
        notes: None,
    }
}

pub fn join_request(name: &str) -> JoinQueue {
    JoinQueue {
        customer_name: name.to_string(),
        customer_phone: "0612345678".to_string(),
        barber_id: None,
    }
}
