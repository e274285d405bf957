//! Type definitions for the fraud detection app

pub mod prediction;
pub mod record;

pub use prediction::{Explanation, FeatureContribution, Prediction, PredictionReport};
pub use record::{CellValue, TransactionInput};
