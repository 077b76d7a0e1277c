//! API handlers for Chairtime REST endpoints

pub mod availability;
pub mod bookings;
pub mod health;
pub mod openapi;
pub mod queue;
pub mod wait_time;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Availability
        .route("/availability", get(availability::range_availability))
        .route("/availability/:date", get(availability::slot_availability))
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/status", patch(bookings::update_booking_status))
        // Walk-in queue
        .route("/queue", get(queue::list_queue))
        .route("/queue/join", post(queue::join_queue))
        .route("/queue/:id", get(queue::get_queue_entry))
        .route("/queue/:id/leave", post(queue::leave_queue))
        .route("/queue/:id/status", patch(queue::update_queue_status))
        .route("/wait-time", get(wait_time::get_wait_time))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
