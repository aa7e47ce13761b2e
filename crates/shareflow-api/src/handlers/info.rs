//! File metadata handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use shareflow_core::{AppError, EvictionReason, FileRecordResponse};
use shareflow_services::evict_now;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Returns metadata only. Records at their download limit still show up
/// here; only expiry makes the metadata itself unavailable.
#[utoipa::path(
    get,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File identifier")),
    responses(
        (status = 200, description = "File metadata", body = FileRecordResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 410, description = "File has expired", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_id = %id))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileRecordResponse>, HttpAppError> {
    let record = state
        .registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

    if record.is_expired(Utc::now()) {
        evict_now(
            &state.registry,
            state.store.as_ref(),
            id,
            EvictionReason::Expired,
        )
        .await;
        state.persistence.save_deferred();
        return Err(AppError::Expired(format!("File {} has expired", id)).into());
    }

    Ok(Json(FileRecordResponse::from(&record)))
}
