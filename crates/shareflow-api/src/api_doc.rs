//! OpenAPI documentation.
//!
//! Served at `/api/openapi.json` and rendered by RapiDoc under `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use shareflow_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shareflow API",
        description = "Self-hosted file sharing: upload a file, hand out an expiring link, and let the server clean up after itself. Files expire by age or download count; listings, search, and stats run over the live registry. All file endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::list::list_files,
        handlers::search::search_files,
        handlers::stats::get_stats,
        handlers::bulk_delete::bulk_delete_files,
        handlers::info::get_file,
        handlers::delete::delete_file,
        handlers::download::download_file,
        handlers::health::health_check,
    ),
    components(schemas(
        models::FileRecordResponse,
        models::UploadResponse,
        models::ListResponse,
        models::StatsResponse,
        models::BulkDeleteRequest,
        models::BulkDeleteResponse,
        error::ErrorResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "files", description = "Upload, share, and manage files"),
        (name = "system", description = "Health and service information")
    )
)]
pub struct ApiDoc;
