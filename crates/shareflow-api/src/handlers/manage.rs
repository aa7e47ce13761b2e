//! Browser management page
//!
//! A single self-contained HTML page embedded at compile time, so the
//! binary serves it regardless of the working directory.

use axum::response::Html;

const MANAGE_PAGE: &str = include_str!("../../static/manage.html");

pub async fn manage_page() -> Html<&'static str> {
    Html(MANAGE_PAGE)
}
