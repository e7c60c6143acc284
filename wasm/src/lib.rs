//! WebAssembly module for the Leaf Disease Detection web client
//!
//! Provides client-side helpers for:
//! - Upload preflight checks (same rules as the server)
//! - Choosing how to present an analysis result

use js_sys::Array;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Check an upload before sending it, using the server's limits.
///
/// Rejections carry the same message the server would return.
#[wasm_bindgen]
pub fn preflight_upload(size_bytes: usize, content_type: &str) -> Result<(), JsValue> {
    UploadPolicy::default()
        .check_declared(size_bytes, content_type)
        .map(|_| ())
        .map_err(|rejection| {
            let message = rejection.to_string();
            web_sys::console::warn_1(&JsValue::from_str(&message));
            JsValue::from_str(&message)
        })
}

/// Content types the server accepts
#[wasm_bindgen]
pub fn supported_content_types() -> Array {
    ImageFormat::ALL
        .iter()
        .map(|format| JsValue::from_str(format.mime_type()))
        .collect()
}

/// Which result panel to render for an analysis response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView {
    InvalidImage,
    Disease,
    Healthy,
}

impl ResultView {
    pub fn for_result(result: &DiseaseAnalysisResult) -> Self {
        if result.disease_type == DiseaseType::InvalidImage {
            ResultView::InvalidImage
        } else if result.disease_detected {
            ResultView::Disease
        } else {
            ResultView::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultView::InvalidImage => "invalid_image",
            ResultView::Disease => "disease",
            ResultView::Healthy => "healthy",
        }
    }
}

/// Pick the panel for a JSON analysis response: "invalid_image", "disease" or "healthy"
#[wasm_bindgen]
pub fn result_view(result_json: &str) -> Result<String, JsValue> {
    let result: DiseaseAnalysisResult = serde_json::from_str(result_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid result JSON: {}", e)))?;

    Ok(ResultView::for_result(&result).as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_json(disease_type: &str, detected: bool, severity: &str) -> String {
        format!(
            r#"{{"disease_detected":{},"disease_name":null,"disease_type":"{}","severity":"{}","confidence":0.0,"symptoms":[],"possible_causes":[],"treatment":["x"],"analysis_timestamp":"2025-01-01T00:00:00+00:00"}}"#,
            detected, disease_type, severity
        )
    }

    #[test]
    fn test_result_view_selection() {
        let invalid: DiseaseAnalysisResult =
            serde_json::from_str(&result_json("invalid_image", false, "unknown")).unwrap();
        let diseased: DiseaseAnalysisResult =
            serde_json::from_str(&result_json("viral", true, "mild")).unwrap();
        let healthy: DiseaseAnalysisResult =
            serde_json::from_str(&result_json("healthy", false, "none")).unwrap();

        assert_eq!(ResultView::for_result(&invalid), ResultView::InvalidImage);
        assert_eq!(ResultView::for_result(&diseased), ResultView::Disease);
        assert_eq!(ResultView::for_result(&healthy), ResultView::Healthy);
    }

    #[test]
    fn test_view_names() {
        assert_eq!(ResultView::InvalidImage.as_str(), "invalid_image");
        assert_eq!(ResultView::Disease.as_str(), "disease");
        assert_eq!(ResultView::Healthy.as_str(), "healthy");
    }
}
