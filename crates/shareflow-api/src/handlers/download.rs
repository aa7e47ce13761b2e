//! File download handler
//!
//! Streams stored content back to the client. Policy checks run in a fixed
//! order: existence, password, expiry, download limit. An expired record
//! found here is evicted on the spot instead of waiting for the sweeper.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use shareflow_core::{AppError, EvictionReason};
use shareflow_services::evict_now;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DownloadQuery {
    /// Password for protected files
    pub password: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}/content",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File identifier"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Missing or wrong password", body = ErrorResponse),
        (status = 403, description = "Download limit reached", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 410, description = "File has expired", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(file_id = %id))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, HttpAppError> {
    let record = state
        .registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

    if let Some(expected) = &record.password {
        if query.password.as_deref() != Some(expected.as_str()) {
            return Err(AppError::Unauthorized("Invalid password".to_string()).into());
        }
    }

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

    // Counts the download before the body is sent; an aborted transfer
    // still consumes a grant.
    let downloads = state.registry.increment_downloads(id).await?;

    let stream = state.store.open_stream(&record.content_path).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, record.content_type.as_str())
        .header(header::CONTENT_LENGTH, record.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                disposition_filename(&record.original_name)
            ),
        )
        .header("X-Checksum", record.checksum.as_str())
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    state.persistence.save_deferred();

    tracing::info!(
        file_id = %id,
        downloads,
        remaining = ?record.remaining_downloads().map(|r| r.saturating_sub(1)),
        "File downloaded"
    );

    Ok(response)
}

/// ASCII-only filename for the Content-Disposition header. HeaderValue
/// rejects non-ASCII bytes, and an embedded quote would end the
/// quoted-string early.
fn disposition_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
