//! Walk-in queue endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{queue::UpdateQueueStatus, JoinQueue, QueueEntry},
    AppState,
};

/// Join the walk-in queue
#[utoipa::path(
    post,
    path = "/queue/join",
    tag = "queue",
    request_body = JoinQueue,
    responses(
        (status = 201, description = "Entry added with its position and estimate", body = QueueEntry),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn join_queue(
    State(state): State<AppState>,
    Json(request): Json<JoinQueue>,
) -> AppResult<(StatusCode, Json<QueueEntry>)> {
    let entry = state.services.queue.join(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Active queue: waiting entries by position, then those in service
#[utoipa::path(
    get,
    path = "/queue",
    tag = "queue",
    responses(
        (status = 200, description = "Active entries", body = Vec<QueueEntry>)
    )
)]
pub async fn list_queue(State(state): State<AppState>) -> AppResult<Json<Vec<QueueEntry>>> {
    let entries = state.services.queue.list().await?;
    Ok(Json(entries))
}

/// Get queue entry by ID
#[utoipa::path(
    get,
    path = "/queue/{id}",
    tag = "queue",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID")
    ),
    responses(
        (status = 200, description = "Queue entry", body = QueueEntry),
        (status = 404, description = "Entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_queue_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<QueueEntry>> {
    let entry = state.services.queue.get(id).await?;
    Ok(Json(entry))
}

/// Leave the queue before being served
#[utoipa::path(
    post,
    path = "/queue/{id}/leave",
    tag = "queue",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID")
    ),
    responses(
        (status = 204, description = "Entry left the queue"),
        (status = 404, description = "Entry not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Entry is no longer waiting", body = crate::error::ErrorResponse)
    )
)]
pub async fn leave_queue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.queue.leave(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Seat, complete or mark a walk-in as no-show
#[utoipa::path(
    patch,
    path = "/queue/{id}/status",
    tag = "queue",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID")
    ),
    request_body = UpdateQueueStatus,
    responses(
        (status = 200, description = "Status updated", body = QueueEntry),
        (status = 404, description = "Entry not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_queue_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateQueueStatus>,
) -> AppResult<Json<QueueEntry>> {
    let entry = state
        .services
        .queue
        .update_status(id, request.status)
        .await?;
    Ok(Json(entry))
}
