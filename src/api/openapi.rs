//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{availability, bookings, health, queue, wait_time};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chairtime API",
        version = "1.0.0",
        description = "Appointment capacity, walk-in queue and wait-time REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Availability
        availability::range_availability,
        availability::slot_availability,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::update_booking_status,
        // Queue
        queue::join_queue,
        queue::list_queue,
        queue::get_queue_entry,
        queue::leave_queue,
        queue::update_queue_status,
        wait_time::get_wait_time,
    ),
    components(
        schemas(
            // Availability
            crate::models::capacity::DateAvailability,
            crate::models::capacity::DateStatus,
            crate::models::capacity::SlotAvailability,
            crate::models::capacity::SlotStatus,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingStatus,
            crate::models::booking::CreateBooking,
            crate::models::booking::UpdateBookingStatus,
            // Queue
            crate::models::queue::QueueEntry,
            crate::models::queue::QueueStatus,
            crate::models::queue::JoinQueue,
            crate::models::queue::UpdateQueueStatus,
            crate::models::queue::WaitTimeSummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "availability", description = "Calendar and slot availability"),
        (name = "bookings", description = "Appointment booking and administration"),
        (name = "queue", description = "Walk-in queue and live wait time")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
