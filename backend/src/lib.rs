//! Leaf Disease Detection service
//!
//! Accepts leaf photos over HTTP, asks a hosted vision-language model for a
//! diagnosis, and returns it in a fixed JSON shape.

use std::sync::Arc;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use crate::config::Config;
pub use error::{AppError, AppResult};

use crate::config::LogFormat;
use external::GroqVisionClient;
use services::DiseaseDetectionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub detector: DiseaseDetectionService,
}

impl AppState {
    /// Build state backed by the hosted vision model named in `config`
    pub fn from_config(config: Config) -> AppResult<Self> {
        let client = GroqVisionClient::new(&config.inference)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let detector = DiseaseDetectionService::new(
            Arc::new(client),
            config.inference_params(),
            config.upload_policy(),
        );

        Ok(Self {
            config: Arc::new(config),
            detector,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::api_routes(state.detector.policy().max_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Initialize tracing, honouring `RUST_LOG` when set
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "leafscan_backend=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
