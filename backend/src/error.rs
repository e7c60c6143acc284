//! Error handling for the Leaf Disease Detection service
//!
//! Separates "fix your input" failures from "try again later" failures so
//! callers can tell them apart from the error code alone.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use shared::UploadRejection;

use crate::external::InferenceError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Upload errors
    #[error("No file provided")]
    NoFile,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error(transparent)]
    UploadRejected(#[from] UploadRejection),

    // External service errors
    #[error("Inference service error: {0}")]
    InferenceService(#[from] InferenceError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::InferenceService(_))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NoFile => (
                StatusCode::BAD_REQUEST,
                "NO_FILE",
                "No file provided".to_string(),
            ),
            AppError::MalformedUpload(msg) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_UPLOAD",
                format!("Malformed upload: {}", msg),
            ),
            AppError::UploadRejected(rejection) => {
                let (status, code) = match rejection {
                    UploadRejection::EmptyFile => (StatusCode::BAD_REQUEST, "EMPTY_FILE"),
                    UploadRejection::InvalidFileType { .. } => {
                        (StatusCode::BAD_REQUEST, "INVALID_FILE_TYPE")
                    }
                    UploadRejection::PayloadTooLarge { .. } => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
                    }
                };
                (status, code, rejection.to_string())
            }
            AppError::InferenceService(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INFERENCE_SERVICE_ERROR",
                "Failed to process image file. Please try again later.".to_string(),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                format!("Configuration error: {}", msg),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error. Please try again later.".to_string(),
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                retryable: self.is_retryable(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NoFile, StatusCode::BAD_REQUEST),
            (AppError::from(UploadRejection::EmptyFile), StatusCode::BAD_REQUEST),
            (
                AppError::from(UploadRejection::InvalidFileType {
                    received: "image/gif".into(),
                    supported: "image/png".into(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(UploadRejection::PayloadTooLarge { size: 11, max: 10 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::from(InferenceError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_only_inference_errors_retryable() {
        assert!(AppError::from(InferenceError::Network("reset".into())).is_retryable());
        assert!(!AppError::from(UploadRejection::EmptyFile).is_retryable());
        assert!(!AppError::Internal("boom".into()).is_retryable());
    }
}
