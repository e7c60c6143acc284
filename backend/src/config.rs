//! Configuration management for the Leaf Disease Detection service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with LEAF__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use shared::{UploadPolicy, MAX_UPLOAD_BYTES};

use crate::external::InferenceParams;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Vision model configuration
    pub inference: InferenceConfig,

    /// Upload limits
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Chat completions endpoint (OpenAI compatible)
    pub endpoint: String,

    /// Bearer token for the endpoint
    pub api_key: String,

    /// Vision model identifier
    pub model: String,

    /// Sampling temperature, clamped to 0.0-2.0
    pub temperature: f32,

    /// Maximum tokens in the reply
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Largest accepted image in bytes
    pub max_bytes: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LEAF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.format", "pretty")?
            .set_default("inference.endpoint", DEFAULT_ENDPOINT)?
            .set_default("inference.api_key", "")?
            .set_default("inference.model", DEFAULT_MODEL)?
            .set_default("inference.temperature", 0.3)?
            .set_default("inference.max_tokens", 1024)?
            .set_default("inference.timeout_secs", 60)?
            .set_default("upload.max_bytes", MAX_UPLOAD_BYTES as u64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LEAF__ prefix)
            .add_source(
                Environment::with_prefix("LEAF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;

        // The hosted provider's conventional variable, used when nothing else set a key
        if config.inference.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("GROQ_API_KEY") {
                config.inference.api_key = key;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inference.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "inference.api_key is required (set LEAF__INFERENCE__API_KEY or GROQ_API_KEY)"
                    .into(),
            ));
        }
        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "inference.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Message(
                "upload.max_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn inference_params(&self) -> InferenceParams {
        InferenceParams::new(self.inference.temperature, self.inference.max_tokens)
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.upload.max_bytes)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl InferenceConfig {
    /// Settings with the stock endpoint and model for the given key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout_secs: 60,
        }
    }
}
