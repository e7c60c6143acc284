//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use leafscan_backend::{
    config::{InferenceConfig, LoggingConfig, ServerConfig, UploadConfig},
    create_app,
    external::{InferenceError, InferenceParams, VisionModel, VisionRequest},
    services::DiseaseDetectionService,
    AppState, Config,
};
use shared::UploadPolicy;

pub const BOUNDARY: &str = "leafscan-test-boundary";

pub const EARLY_BLIGHT_REPLY: &str = r#"{"disease_detected":true,"disease_name":"Early Blight","disease_type":"fungal","severity":"moderate","confidence":92.5,"symptoms":["Dark concentric rings on older leaves"],"possible_causes":["Alternaria solani spores spread by rain splash"],"treatment":["Remove infected leaves","Apply a copper-based fungicide"]}"#;

/// What the model was asked to do on its last call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub image_base64: String,
    pub mime_type: String,
    pub prompt: String,
    pub params: InferenceParams,
}

type Responder = Box<dyn Fn() -> Result<String, InferenceError> + Send + Sync>;

/// Vision model that answers from a script and records how it was called
pub struct ScriptedModel {
    respond: Responder,
    calls: AtomicUsize,
    last_request: Mutex<Option<RecordedRequest>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::with(move || Ok(reply.clone()))
    }

    pub fn failing(error: fn() -> InferenceError) -> Arc<Self> {
        Self::with(move || Err(error()))
    }

    fn with(respond: impl Fn() -> Result<String, InferenceError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn complete(&self, request: VisionRequest<'_>) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(RecordedRequest {
            image_base64: request.image_base64.to_string(),
            mime_type: request.mime_type.to_string(),
            prompt: request.prompt.to_string(),
            params: request.params,
        });
        (self.respond)()
    }

    fn model_name(&self) -> &str {
        "scripted-vision"
    }
}

pub fn service_with(model: Arc<ScriptedModel>) -> DiseaseDetectionService {
    DiseaseDetectionService::new(model, InferenceParams::default(), UploadPolicy::default())
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        logging: LoggingConfig::default(),
        inference: InferenceConfig::with_api_key("gsk_test"),
        upload: UploadConfig::default(),
    }
}

pub fn app_with(model: Arc<ScriptedModel>) -> Router {
    create_app(AppState {
        config: Arc::new(test_config()),
        detector: service_with(model),
    })
}

/// POST a single multipart part to the detection endpoint
pub fn upload_request(field_name: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field_name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/disease-detection-file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Bytes that start like a JPEG file
pub fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    let header = [0xFF, 0xD8, 0xFF, 0xE0];
    let n = header.len().min(len);
    data[..n].copy_from_slice(&header[..n]);
    data
}
