//! Groq vision client
//!
//! Client for Groq's OpenAI-compatible chat completions API. Any endpoint
//! speaking the same protocol works by changing `inference.endpoint`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::vision::{InferenceError, VisionModel, VisionRequest};
use crate::config::InferenceConfig;

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for a hosted vision-language model
#[derive(Clone)]
pub struct GroqVisionClient {
    endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

/// Request body for the chat completions endpoint
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

/// Multimodal message part
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Response from the chat completions endpoint
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: &str, request: &VisionRequest<'_>) -> Self {
        let data_url = format!("data:{};base64,{}", request.mime_type, request.image_base64);

        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: request.prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            stream: false,
        }
    }
}

impl ChatCompletionResponse {
    /// Text of the first choice. Missing content reads as an empty reply.
    pub fn into_reply(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

/// Map a non-success HTTP status onto an error
pub fn error_for_status(status: StatusCode, body: &str) -> InferenceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            InferenceError::Unauthorized(status.as_u16())
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => InferenceError::Timeout,
        _ => InferenceError::Upstream {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    }
}

impl GroqVisionClient {
    /// Create a new client from inference settings
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::ClientBuild(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl VisionModel for GroqVisionClient {
    async fn complete(&self, request: VisionRequest<'_>) -> Result<String, InferenceError> {
        let body = ChatCompletionRequest::new(&self.model, &request);
        let started = Instant::now();

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_for_status(status, &body));
        }

        let envelope: ChatCompletionResponse = response.json().await?;

        if let Some(reason) = envelope.choices.first().and_then(|c| c.finish_reason.as_deref()) {
            if reason == "length" {
                tracing::warn!("Vision model reply truncated at max_tokens");
            }
        }
        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Vision model replied"
        );

        Ok(envelope.into_reply())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
