//! Service information and health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

const SERVICE_NAME: &str = "Leaf Disease Detection API";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub environment: String,
    pub model: String,
}

#[derive(Serialize)]
pub struct EndpointDocs {
    pub disease_detection: String,
    pub health_check: String,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub description: String,
    pub endpoints: EndpointDocs,
    pub status: String,
}

/// Root endpoint describing the API
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "AI-powered leaf disease detection using hosted vision-language models"
            .to_string(),
        endpoints: EndpointDocs {
            disease_detection: "/disease-detection-file (POST) - Upload image for disease detection"
                .to_string(),
            health_check: "/health (GET) - API health status".to_string(),
        },
        status: "operational".to_string(),
    })
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        model: state.detector.model_name().to_string(),
    })
}
