//! Shareflow CLI support library.
//!
//! Holds the HTTP client used by the `shareflow` binary. The client has no
//! authentication layer; password-protected files take their password as a
//! query parameter on download.

pub mod client;

pub use client::ApiClient;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
