//! Prediction and explanation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Index of the fraud class in probability and attribution vectors
pub const FRAUD_CLASS: usize = 1;

/// Output of a single model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class (0 = legitimate, 1 = fraud)
    pub label: u8,
    /// Class probabilities, index-aligned with the label
    pub probabilities: [f64; 2],
    /// Encoded, reordered feature values before scaling
    pub processed: Vec<f64>,
    /// Feature values after scaling (model input)
    pub scaled: Vec<f64>,
}

impl Prediction {
    pub fn is_fraud(&self) -> bool {
        self.label as usize == FRAUD_CLASS
    }

    /// Probability of the predicted class
    pub fn confidence(&self) -> f64 {
        self.probabilities[self.label as usize]
    }

    pub fn fraud_probability(&self) -> f64 {
        self.probabilities[FRAUD_CLASS]
    }
}

/// One feature's share of the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    /// Pre-scaling value used for display
    pub value: f64,
    /// Signed push on the positive-class score
    pub contribution: f64,
}

/// Additive attribution for the positive class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Expected model output over the background data
    pub base_value: f64,
    /// Per-feature contributions, in bundle feature order
    pub contributions: Vec<FeatureContribution>,
}

impl Explanation {
    /// base + sum of contributions, the explained model output
    pub fn output_value(&self) -> f64 {
        self.base_value + self.contributions.iter().map(|c| c.contribution).sum::<f64>()
    }

    /// Contributions sorted by absolute size, largest first
    pub fn ranked(&self) -> Vec<&FeatureContribution> {
        let mut ranked: Vec<&FeatureContribution> = self.contributions.iter().collect();
        ranked.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Prediction plus explanation, as returned by the JSON API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub prediction_id: String,
    pub label: u8,
    pub is_fraud: bool,
    pub probabilities: [f64; 2],
    pub explanation: Explanation,
    pub timestamp: DateTime<Utc>,
}

impl PredictionReport {
    pub fn new(prediction: &Prediction, explanation: Explanation) -> Self {
        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            label: prediction.label,
            is_fraud: prediction.is_fraud(),
            probabilities: prediction.probabilities,
            explanation,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(feature: &str, contribution: f64) -> FeatureContribution {
        FeatureContribution {
            feature: feature.to_string(),
            value: 0.0,
            contribution,
        }
    }

    #[test]
    fn test_output_value_is_additive() {
        let explanation = Explanation {
            base_value: 0.2,
            contributions: vec![contribution("a", 0.3), contribution("b", -0.1)],
        };
        assert!((explanation.output_value() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_ranked_by_magnitude() {
        let explanation = Explanation {
            base_value: 0.0,
            contributions: vec![
                contribution("small", 0.01),
                contribution("negative", -0.5),
                contribution("positive", 0.2),
            ],
        };
        let order: Vec<&str> = explanation
            .ranked()
            .iter()
            .map(|c| c.feature.as_str())
            .collect();
        assert_eq!(order, vec!["negative", "positive", "small"]);
    }

    #[test]
    fn test_prediction_confidence() {
        let prediction = Prediction {
            label: 1,
            probabilities: [0.25, 0.75],
            processed: vec![],
            scaled: vec![],
        };
        assert!(prediction.is_fraud());
        assert_eq!(prediction.confidence(), 0.75);
        assert_eq!(prediction.fraud_probability(), 0.75);
    }
}
