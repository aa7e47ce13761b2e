//! File search handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use shareflow_core::models::SearchParams;
use shareflow_core::{AppError, FileRecordResponse};
use shareflow_registry::{paginate, search, Page, SearchFilter, SortKey};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Substring match on name and description, exact match on tag. Both
/// filters are optional; with neither set this is a sortable listing.
#[utoipa::path(
    get,
    path = "/api/v0/files/search",
    tag = "files",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching files", body = Vec<FileRecordResponse>),
        (status = 400, description = "Invalid search parameters", body = ErrorResponse)
    )
)]
pub async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FileRecordResponse>>, HttpAppError> {
    params.validate().map_err(AppError::InvalidInput)?;

    let sort = match params.sort.as_deref() {
        Some(s) => s
            .parse::<SortKey>()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?,
        None => SortKey::default(),
    };
    let filter = SearchFilter {
        query: params.q.clone(),
        tag: params.tag.clone(),
    };

    let records = state.registry.snapshot().await;
    let matched = search(records, &filter, sort);
    let page = Page::clamped(params.offset, params.limit);
    let (items, _total) = paginate(matched, page);

    Ok(Json(items.iter().map(FileRecordResponse::from).collect()))
}
