//! Business logic services

pub mod detection;
pub mod prompt;

pub use detection::DiseaseDetectionService;
