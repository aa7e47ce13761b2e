use anyhow::Context;

use shareflow_api::{setup, telemetry};
use shareflow_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry()?;

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize the application (storage, registry restore, routes)
    let (state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::start_server(&config, state, router).await?;

    Ok(())
}
