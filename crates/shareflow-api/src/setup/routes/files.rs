//! File route group.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

pub fn file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/files", API_PREFIX),
            post(handlers::upload::upload_file).get(handlers::list::list_files),
        )
        .route(
            &format!("{}/files/search", API_PREFIX),
            get(handlers::search::search_files),
        )
        .route(
            &format!("{}/files/stats", API_PREFIX),
            get(handlers::stats::get_stats),
        )
        .route(
            &format!("{}/files/bulk-delete", API_PREFIX),
            post(handlers::bulk_delete::bulk_delete_files),
        )
        .route(
            &format!("{}/files/{{id}}", API_PREFIX),
            get(handlers::info::get_file).delete(handlers::delete::delete_file),
        )
        .route(
            &format!("{}/files/{{id}}/content", API_PREFIX),
            get(handlers::download::download_file),
        )
        // Short link used in upload responses and the management page.
        .route("/download/{id}", get(handlers::download::download_file))
}
