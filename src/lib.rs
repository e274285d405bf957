//! Fraud Detection App Library
//!
//! Two pieces share this crate: an interactive scorer that loads a trained
//! classifier bundle, predicts on a manually entered transaction and explains
//! the score per feature; and a loader that turns a CSV of names, phone
//! numbers and emails into a User/Phone/Email graph over Bolt.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod form;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod telemetry;
pub mod types;
pub mod ui;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use feature_extractor::FeatureExtractor;
pub use models::inference::InferenceEngine;
pub use types::{prediction::Prediction, record::TransactionInput};
