use shelf_api::{routes, server, state::AppState, telemetry};
use shelf_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage backend, task queue, thumbnailer)
    let state = AppState::build(config.clone()).await?;
    let app = routes::build_router(state);

    // Start the server
    server::start_server(&config, app).await?;

    Ok(())
}
