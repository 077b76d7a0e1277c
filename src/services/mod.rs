//! Business logic services

pub mod availability;
pub mod bookings;
pub mod queue;
pub mod wait_time;

use std::sync::Arc;

use crate::{clock::Clock, error::AppResult, repository::Store, scheduling::BookingPolicy};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub availability: availability::AvailabilityService,
    pub bookings: bookings::BookingsService,
    pub queue: queue::QueueService,
    pub wait_time: wait_time::WaitTimeService,
    store: Arc<dyn Store>,
}

impl Services {
    /// Create all services over one store, policy and clock
    pub fn new(store: Arc<dyn Store>, policy: Arc<BookingPolicy>, clock: Arc<dyn Clock>) -> Self {
        let wait_time =
            wait_time::WaitTimeService::new(store.clone(), policy.clone(), clock.clone());
        let queue = queue::QueueService::new(store.clone(), wait_time.clone(), clock.clone());

        Self {
            availability: availability::AvailabilityService::new(
                store.clone(),
                policy.clone(),
                clock.clone(),
            ),
            bookings: bookings::BookingsService::new(store.clone(), policy, clock, queue.clone()),
            queue,
            wait_time,
            store,
        }
    }

    /// Round trip to the store, for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
