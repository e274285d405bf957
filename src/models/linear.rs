//! Binary logistic regression

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One weight per (scaled) feature
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    /// Log-odds of the fraud class
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.intercept + self.coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
    }

    pub fn predict_proba(&self, x: &[f64]) -> [f64; 2] {
        let p = sigmoid(self.decision_function(x));
        [1.0 - p, p]
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
