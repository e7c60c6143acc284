//! Vision model abstraction
//!
//! The detection pipeline talks to the hosted model through [`VisionModel`],
//! so the HTTP client can be swapped for a scripted one in tests.

use async_trait::async_trait;
use thiserror::Error;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl InferenceParams {
    pub const MIN_TEMPERATURE: f32 = 0.0;
    pub const MAX_TEMPERATURE: f32 = 2.0;

    /// Build parameters, clamping temperature to 0.0-2.0 and max_tokens to at least 1
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        let temperature = if temperature.is_nan() {
            Self::default().temperature
        } else {
            temperature.clamp(Self::MIN_TEMPERATURE, Self::MAX_TEMPERATURE)
        };

        Self {
            temperature,
            max_tokens: max_tokens.max(1),
        }
    }
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// One image analysis request
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    /// Base64 encoded image bytes
    pub image_base64: &'a str,
    pub mime_type: &'a str,
    pub prompt: &'a str,
    pub params: InferenceParams,
}

/// Failure talking to the hosted model. All variants are transient from the
/// caller's point of view.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Request to vision model timed out")]
    Timeout,

    #[error("Network error reaching vision model: {0}")]
    Network(String),

    #[error("Vision model rejected the credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("Vision model returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Vision model response was not a chat completion: {0}")]
    InvalidEnvelope(String),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else if e.is_decode() {
            InferenceError::InvalidEnvelope(e.to_string())
        } else {
            InferenceError::Network(e.to_string())
        }
    }
}

/// Hosted vision-language model
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Send the image and prompt, returning the model's raw text reply
    async fn complete(&self, request: VisionRequest<'_>) -> Result<String, InferenceError>;

    /// Model identifier, for logs and the health endpoint
    fn model_name(&self) -> &str;
}
