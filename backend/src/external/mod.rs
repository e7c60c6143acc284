//! External API integrations

pub mod groq;
pub mod vision;

pub use groq::GroqVisionClient;
pub use vision::{InferenceError, InferenceParams, VisionModel, VisionRequest};
