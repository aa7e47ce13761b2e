//! File listing handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use shareflow_core::models::{ListParams, ListResponse};
use shareflow_core::{AppError, FileRecordResponse};
use shareflow_registry::{paginate, search, Page, SearchFilter, SortKey};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Newest uploads first. Includes records the sweeper has not visited yet.
#[utoipa::path(
    get,
    path = "/api/v0/files",
    tag = "files",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated file listing", body = ListResponse),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, HttpAppError> {
    params.validate().map_err(AppError::InvalidInput)?;

    let records = state.registry.snapshot().await;
    let sorted = search(records, &SearchFilter::default(), SortKey::UploadTime);
    let page = Page::clamped(params.offset, params.limit);
    let (items, total) = paginate(sorted, page);

    Ok(Json(ListResponse {
        files: items.iter().map(FileRecordResponse::from).collect(),
        total,
        limit: page.limit,
        offset: page.offset,
    }))
}
