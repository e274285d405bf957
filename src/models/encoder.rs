//! Label encoding of categorical columns

use crate::error::{AppError, AppResult};
use std::collections::HashMap;

/// Maps category labels to integer codes by their sorted position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on the given labels (sorted, deduplicated)
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut classes: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code of a label, failing on labels not seen during fit
    pub fn transform(&self, column: &str, label: &str) -> AppResult<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| AppError::UnseenCategory {
                column: column.to_string(),
                value: label.to_string(),
            })
    }
}

/// How categorical columns are turned into numbers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoricalEncoding {
    /// Fit a fresh encoder on the incoming row for every call.
    ///
    /// A one-row fit always yields code 0, which need not match the codes
    /// the model saw in training.
    #[default]
    PerCall,
    /// Fixed lookup against the vocabulary stored with the model
    Vocabulary(HashMap<String, LabelEncoder>),
}

impl CategoricalEncoding {
    /// Build the fixed-vocabulary variant from the bundle's category lists
    pub fn from_vocabulary(categories: &HashMap<String, Vec<String>>) -> Self {
        CategoricalEncoding::Vocabulary(
            categories
                .iter()
                .map(|(column, labels)| (column.clone(), LabelEncoder::fit(labels.as_slice())))
                .collect(),
        )
    }

    pub fn is_per_call(&self) -> bool {
        matches!(self, CategoricalEncoding::PerCall)
    }

    /// Encode one categorical cell
    pub fn encode(&self, column: &str, label: &str) -> AppResult<usize> {
        match self {
            CategoricalEncoding::PerCall => LabelEncoder::fit(&[label]).transform(column, label),
            CategoricalEncoding::Vocabulary(encoders) => match encoders.get(column) {
                Some(encoder) => encoder.transform(column, label),
                None => Err(AppError::UnseenCategory {
                    column: column.to_string(),
                    value: label.to_string(),
                }),
            },
        }
    }
}
