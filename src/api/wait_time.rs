//! Live wait-time endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::WaitTimeSummary, AppState};

/// Current wait for a walk-in arriving now
#[utoipa::path(
    get,
    path = "/wait-time",
    tag = "queue",
    responses(
        (status = 200, description = "Wait-time summary", body = WaitTimeSummary)
    )
)]
pub async fn get_wait_time(State(state): State<AppState>) -> AppResult<Json<WaitTimeSummary>> {
    let summary = state.services.wait_time.summary().await?;
    Ok(Json(summary))
}
