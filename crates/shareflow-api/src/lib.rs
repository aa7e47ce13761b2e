//! Shareflow API Library
//!
//! This crate provides the HTTP handlers, routing, and application setup
//! for the Shareflow file sharing service. The binary stays thin so the
//! integration tests drive the exact same initialization path.

// Module declarations
mod api_doc;
mod handlers;
mod utils;

// Public modules
pub mod constants;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
