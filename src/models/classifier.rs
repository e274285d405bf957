//! Classifier variants an artifact bundle can carry

use crate::models::forest::RandomForest;
use crate::models::linear::LogisticRegression;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl Classifier {
    /// Short model name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::RandomForest(_) => "random_forest",
            Classifier::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// Width of the input row
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::RandomForest(forest) => forest.n_features,
            Classifier::LogisticRegression(model) => model.n_features(),
        }
    }

    pub(crate) fn prepare(&mut self) -> Result<(), String> {
        match self {
            Classifier::RandomForest(forest) => forest.prepare(),
            Classifier::LogisticRegression(model) if model.coef.is_empty() => {
                Err("logistic regression has no coefficients".to_string())
            }
            Classifier::LogisticRegression(_) => Ok(()),
        }
    }

    /// Class probabilities `[legitimate, fraud]`
    pub fn predict_proba(&self, x: &[f64]) -> [f64; 2] {
        match self {
            Classifier::RandomForest(forest) => {
                let proba = forest.predict_proba(x);
                [proba[0], proba[1]]
            }
            Classifier::LogisticRegression(model) => model.predict_proba(x),
        }
    }

    /// Predicted class; ties resolve to the first class
    pub fn predict(&self, x: &[f64]) -> u8 {
        let proba = self.predict_proba(x);
        if proba[1] > proba[0] {
            1
        } else {
            0
        }
    }

    /// Per-class score in the space the explainer attributes.
    ///
    /// Probabilities for forests, log-odds for logistic regression.
    pub fn raw_output(&self, x: &[f64]) -> [f64; 2] {
        match self {
            Classifier::RandomForest(_) => self.predict_proba(x),
            Classifier::LogisticRegression(model) => {
                let margin = model.decision_function(x);
                [-margin, margin]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_logistic() {
        let json = r#"{"type":"logistic_regression","coef":[0.5,-0.5],"intercept":0.1}"#;
        let mut model: Classifier = serde_json::from_str(json).unwrap();
        model.prepare().unwrap();
        assert_eq!(model.name(), "logistic_regression");
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.predict(&[0.0, 0.0]), 1);
        assert_eq!(model.predict(&[0.0, 1.0]), 0);
    }

    #[test]
    fn test_raw_output_is_margin_for_logistic() {
        let model = Classifier::LogisticRegression(LogisticRegression {
            coef: vec![2.0],
            intercept: -1.0,
        });
        assert_eq!(model.raw_output(&[1.5]), [-2.0, 2.0]);
    }

    #[test]
    fn test_empty_logistic_rejected() {
        let mut model = Classifier::LogisticRegression(LogisticRegression {
            coef: vec![],
            intercept: 0.0,
        });
        assert!(model.prepare().is_err());
    }
}
