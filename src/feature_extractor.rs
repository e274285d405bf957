//! Turns a form record into the model's numeric input row.
//!
//! Categorical columns are label-encoded and the columns are reordered to the
//! feature list stored with the model. Scaling happens afterwards, in the
//! inference engine.

use crate::error::{AppError, AppResult};
use crate::models::encoder::CategoricalEncoding;
use crate::types::record::{CellValue, TransactionInput};

/// Feature extractor bound to one artifact bundle's feature order
pub struct FeatureExtractor {
    features: Vec<String>,
    encoding: CategoricalEncoding,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(features: Vec<String>, encoding: CategoricalEncoding) -> Self {
        Self { features, encoding }
    }

    /// Extract the processed (encoded, reordered, unscaled) row.
    ///
    /// Input columns that the model does not use are dropped; a model feature
    /// missing from the input is an error.
    pub fn extract(&self, record: &TransactionInput) -> AppResult<Vec<f64>> {
        let row = record.to_row();

        self.features
            .iter()
            .map(|feature| {
                let (column, cell) = row
                    .iter()
                    .find(|(column, _)| *column == feature.as_str())
                    .ok_or_else(|| AppError::MissingFeature(feature.clone()))?;
                match cell {
                    CellValue::Number(v) => Ok(*v),
                    CellValue::Text(label) => Ok(self.encoding.encode(column, label)? as f64),
                }
            })
            .collect()
    }

    /// Get the number of features produced
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Get feature names in model order
    pub fn feature_names(&self) -> &[String] {
        &self.features
    }
}
