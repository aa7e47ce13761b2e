//! HTTP request handlers
//!
//! One file per endpoint. Every fallible handler returns
//! `Result<impl IntoResponse, HttpAppError>` so errors render through the
//! shared [ErrorResponse](crate::error::ErrorResponse) shape.

pub mod bulk_delete;
pub mod delete;
pub mod download;
pub mod health;
pub mod info;
pub mod list;
pub mod manage;
pub mod search;
pub mod stats;
pub mod upload;
