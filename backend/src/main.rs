//! Leaf Disease Detection - Backend Server
//!
//! REST API that diagnoses plant leaf diseases from uploaded photos using a
//! hosted vision-language model.

use std::net::SocketAddr;

use leafscan_backend::{create_app, init_tracing, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.logging.format);

    tracing::info!("Starting Leaf Disease Detection Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Vision model: {}", config.inference.model);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::from_config(config)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
