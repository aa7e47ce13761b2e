//! File deletion handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use shareflow_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File identifier")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_id = %id))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    let record = state
        .registry
        .remove(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

    // The record is gone either way; a content failure leaves orphaned
    // bytes, never a record pointing at nothing.
    if let Err(e) = state.store.remove(&record.content_path).await {
        tracing::error!(
            error = %e,
            file_id = %id,
            key = %record.content_path,
            "Failed to delete content for removed record"
        );
    }

    if let Err(e) = state.persistence.save_now().await {
        tracing::error!(error = %e, "Failed to save snapshot after delete");
    }

    tracing::info!(
        file_id = %id,
        original_name = %record.original_name,
        "File deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
