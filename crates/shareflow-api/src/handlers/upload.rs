//! File upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use shareflow_core::models::UploadResponse;
use shareflow_core::validation::{content_type_allowed, sanitize_filename};
use shareflow_core::{AppError, FileRecord};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{parse_upload_form, validate_file_size};

#[utoipa::path(
    post,
    path = "/api/v0/files",
    tag = "files",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "A 'file' part plus optional text parts: ttl (seconds), max_downloads, password, description, tags (comma-separated)"
    ),
    responses(
        (status = 201, description = "File stored and ready to share", body = UploadResponse),
        (status = 400, description = "Invalid upload form", body = ErrorResponse),
        (status = 413, description = "File exceeds the configured size limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let form = parse_upload_form(multipart).await?;

    validate_file_size(form.data.len(), state.config.max_upload_size_bytes)?;

    if !content_type_allowed(&form.content_type, &state.config.allowed_content_types) {
        return Err(AppError::InvalidInput(format!(
            "Content type '{}' is not allowed. Allowed types: {}",
            form.content_type,
            state.config.allowed_content_types.join(", ")
        ))
        .into());
    }

    let id = Uuid::new_v4();
    let stored_name = format!("{}_{}", id, sanitize_filename(&form.filename));

    let stored = state.store.write(&stored_name, form.data).await?;

    let now = Utc::now();
    let ttl_secs = form.ttl_secs.unwrap_or(state.config.default_ttl_secs);
    let record = FileRecord {
        id,
        stored_name: stored_name.clone(),
        original_name: form.filename,
        size: stored.size,
        content_type: form.content_type,
        checksum: stored.checksum.clone(),
        upload_time: now,
        expires_at: now + Duration::seconds(ttl_secs as i64),
        downloads: 0,
        max_downloads: form
            .max_downloads
            .unwrap_or(state.config.default_max_downloads),
        password: form.password,
        uploader_origin: client_origin(&headers),
        tags: form.tags,
        description: form.description,
        content_path: stored.key,
    };
    let expires_at = record.expires_at;
    let max_downloads = record.max_downloads;
    let size = record.size;
    let original_name = record.original_name.clone();

    if let Err(e) = state.registry.insert(record).await {
        // Cleanup stored content on registry failure
        let store = state.store.clone();
        let key = stored_name.clone();
        tokio::spawn(async move {
            if let Err(cleanup_err) = store.remove(&key).await {
                tracing::debug!(
                    error = %cleanup_err,
                    key = %key,
                    "Failed to clean up content after registry error"
                );
            }
        });
        return Err(e.into());
    }

    // The client is told the file is shareable, so the snapshot must
    // already reflect it; a failed save is logged, never surfaced.
    if let Err(e) = state.persistence.save_now().await {
        tracing::error!(error = %e, "Failed to save snapshot after upload");
    }

    tracing::info!(
        file_id = %id,
        stored_name = %stored_name,
        size,
        ttl_secs,
        "File uploaded"
    );

    let response = UploadResponse {
        id,
        stored_name: stored_name.clone(),
        original_name,
        size,
        checksum: stored.checksum,
        download_url: download_url(&headers, state.config.server_port, id),
        expires_at,
        max_downloads,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Client address for audit purposes. Honors the first `X-Forwarded-For`
/// entry when a proxy sits in front.
fn client_origin(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Absolute download link as seen by the client, built from the request's
/// Host header so it works behind proxies without extra configuration.
fn download_url(headers: &HeaderMap, port: u16, id: Uuid) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "http".to_string());
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("localhost:{}", port));
    format!("{}://{}/download/{}", scheme, host, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_origin_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_origin(&headers), "203.0.113.7");
    }

    #[test]
    fn client_origin_defaults_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_origin(&headers), "unknown");
    }

    #[test]
    fn download_url_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("share.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        let id = Uuid::nil();
        assert_eq!(
            download_url(&headers, 8080, id),
            format!("https://share.example.com/download/{}", id)
        );
    }

    #[test]
    fn download_url_falls_back_to_localhost() {
        let headers = HeaderMap::new();
        let id = Uuid::nil();
        assert_eq!(
            download_url(&headers, 9000, id),
            format!("http://localhost:9000/download/{}", id)
        );
    }
}
