//! HTTP request handlers

mod detection;
mod health;

pub use detection::detect_disease;
pub use health::{health_check, service_info};
