//! Shared types and logic for the Leaf Disease Detection service
//!
//! This crate contains the diagnosis model, upload validation and reply
//! normalization shared between the backend and the browser (via WASM).

pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use models::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;
