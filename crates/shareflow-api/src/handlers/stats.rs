//! Aggregate statistics handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use shareflow_core::models::StatsResponse;
use shareflow_registry::stats;

use crate::error::HttpAppError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/files/stats",
    tag = "files",
    responses(
        (status = 200, description = "Aggregate counters over all tracked files", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, HttpAppError> {
    let records = state.registry.snapshot().await;
    Ok(Json(stats(&records, Utc::now())))
}
