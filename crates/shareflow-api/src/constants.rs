//! API constants
//!
//! Route prefixes shared by the router and the OpenAPI path annotations.
//! Keep them in sync: utoipa annotations are string literals and cannot
//! reference this constant.

/// Versioned API base path.
pub const API_PREFIX: &str = "/api/v0";
