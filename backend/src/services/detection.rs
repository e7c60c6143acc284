//! Leaf disease detection pipeline
//!
//! Validates the upload, forwards it to the vision model once, and
//! normalizes whatever comes back into a [`DiseaseAnalysisResult`].

use std::sync::Arc;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use shared::{normalize_reply, DiseaseAnalysisResult, DiseaseType, UploadPolicy};

use crate::error::AppResult;
use crate::external::{InferenceParams, VisionModel, VisionRequest};
use crate::services::prompt::build_instruction_prompt;

/// Service running one analysis per call. Holds no per-request state.
#[derive(Clone)]
pub struct DiseaseDetectionService {
    model: Arc<dyn VisionModel>,
    params: InferenceParams,
    policy: UploadPolicy,
    prompt: Arc<str>,
}

impl DiseaseDetectionService {
    pub fn new(model: Arc<dyn VisionModel>, params: InferenceParams, policy: UploadPolicy) -> Self {
        Self {
            model,
            params,
            policy,
            prompt: build_instruction_prompt().into(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn policy(&self) -> UploadPolicy {
        self.policy
    }

    /// Analyze one uploaded image.
    ///
    /// Rejected uploads never reach the model. Transport failures surface as
    /// `AppError::InferenceService`; an unusable reply is not an error and
    /// comes back as an `invalid_image` result.
    pub async fn analyze(
        &self,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<DiseaseAnalysisResult> {
        let format = self.policy.validate(data, content_type)?;

        tracing::info!(bytes = data.len(), format = %format, "Converting image to base64");
        let image_base64 = STANDARD.encode(data);
        tracing::debug!(chars = image_base64.len(), "Base64 encoding completed");

        let request = VisionRequest {
            image_base64: &image_base64,
            mime_type: format.mime_type(),
            prompt: &self.prompt,
            params: self.params,
        };

        let started = Instant::now();
        let reply = self.model.complete(request).await?;
        tracing::info!(
            model = %self.model.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_chars = reply.len(),
            "Analyzing leaf image completed"
        );

        let result = normalize_reply(&reply, Utc::now());
        if result.disease_type == DiseaseType::InvalidImage {
            tracing::warn!(symptoms = ?result.symptoms, "Analysis returned invalid_image");
        }

        Ok(result)
    }
}
