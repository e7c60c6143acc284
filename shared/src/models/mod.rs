//! Domain models for the Leaf Disease Detection service

mod analysis;

pub use analysis::*;
