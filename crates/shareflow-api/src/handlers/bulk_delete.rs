//! Bulk file deletion handler

use std::sync::Arc;

use axum::{extract::State, Json};

use shareflow_core::models::{BulkDeleteRequest, BulkDeleteResponse};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Ids that are unknown are skipped, not an error; the response reports
/// how many were actually removed.
#[utoipa::path(
    post,
    path = "/api/v0/files/bulk-delete",
    tag = "files",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Deletion summary", body = BulkDeleteResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse)
    )
)]
pub async fn bulk_delete_files(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, HttpAppError> {
    let requested = request.ids.len();
    let mut deleted = 0;

    for id in request.ids {
        if let Some(record) = state.registry.remove(id).await {
            if let Err(e) = state.store.remove(&record.content_path).await {
                tracing::error!(
                    error = %e,
                    file_id = %id,
                    key = %record.content_path,
                    "Failed to delete content for removed record"
                );
            }
            deleted += 1;
        }
    }

    if deleted > 0 {
        if let Err(e) = state.persistence.save_now().await {
            tracing::error!(error = %e, "Failed to save snapshot after bulk delete");
        }
        tracing::info!(requested, deleted, "Bulk delete completed");
    }

    Ok(Json(BulkDeleteResponse { requested, deleted }))
}
