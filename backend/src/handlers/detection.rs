//! HTTP handler for leaf image uploads

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use shared::{DiseaseAnalysisResult, UploadRejection};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        // The body limit cut the stream short, so the exact size is unknown
        AppError::UploadRejected(UploadRejection::PayloadTooLarge {
            size: max_bytes + 1,
            max: max_bytes,
        })
    } else {
        AppError::MalformedUpload(e.body_text())
    }
}

/// Detect disease in an uploaded leaf image
pub async fn detect_disease(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<DiseaseAnalysisResult>> {
    let span = tracing::info_span!("disease_detection", request_id = %Uuid::new_v4());
    receive_and_analyze(state, multipart).instrument(span).await
}

async fn receive_and_analyze(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<DiseaseAnalysisResult>> {
    let mut multipart = multipart.map_err(|e| AppError::MalformedUpload(e.body_text()))?;
    let max_bytes = state.detector.policy().max_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;

        tracing::info!(%filename, %content_type, "Processing image for disease detection");
        let result = state.detector.analyze(&data, &content_type).await?;
        tracing::info!(%filename, disease_type = %result.disease_type, "Disease detection completed");

        return Ok(Json(result));
    }

    Err(AppError::NoFile)
}
