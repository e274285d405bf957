//! Persisted model components and the inference engine

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod explainer;
pub mod forest;
pub mod inference;
pub mod linear;
pub mod scaler;

pub use artifacts::{load_artifacts, ArtifactBundle, ArtifactCache};
pub use inference::InferenceEngine;
