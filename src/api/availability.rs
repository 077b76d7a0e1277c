//! Availability endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        capacity::{AvailabilityRangeQuery, SlotAvailabilityQuery},
        DateAvailability, SlotAvailability,
    },
    AppState,
};

/// Availability summary for each date of a range
#[utoipa::path(
    get,
    path = "/availability",
    tag = "availability",
    params(AvailabilityRangeQuery),
    responses(
        (status = 200, description = "One summary per date", body = Vec<DateAvailability>),
        (status = 400, description = "Invalid date or range", body = crate::error::ErrorResponse)
    )
)]
pub async fn range_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityRangeQuery>,
) -> AppResult<Json<Vec<DateAvailability>>> {
    let days = state
        .services
        .availability
        .range_availability(&query.start_date, &query.end_date, query.service_id)
        .await?;
    Ok(Json(days))
}

/// Slot-by-slot availability of one date
#[utoipa::path(
    get,
    path = "/availability/{date}",
    tag = "availability",
    params(
        ("date" = String, Path, description = "Date (YYYY-MM-DD)"),
        SlotAvailabilityQuery
    ),
    responses(
        (status = 200, description = "Every configured slot of the date", body = Vec<SlotAvailability>),
        (status = 400, description = "Invalid date", body = crate::error::ErrorResponse),
        (status = 422, description = "Date outside the booking window", body = crate::error::ErrorResponse)
    )
)]
pub async fn slot_availability(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<SlotAvailabilityQuery>,
) -> AppResult<Json<Vec<SlotAvailability>>> {
    let slots = state
        .services
        .availability
        .slot_availability(&date, query.service_id)
        .await?;
    Ok(Json(slots))
}
