//! Prediction and explanation for a single transaction

use crate::error::{AppError, AppResult};
use crate::feature_extractor::FeatureExtractor;
use crate::models::artifacts::ArtifactBundle;
use crate::types::prediction::{Explanation, FeatureContribution, Prediction, FRAUD_CLASS};
use crate::types::record::TransactionInput;
use std::sync::Arc;
use tracing::debug;

/// Inference engine over a loaded artifact bundle
pub struct InferenceEngine {
    bundle: Arc<ArtifactBundle>,
    extractor: FeatureExtractor,
}

impl InferenceEngine {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        let extractor = FeatureExtractor::new(bundle.features.clone(), bundle.encoding.clone());
        Self { bundle, extractor }
    }

    /// Model input columns, in order
    pub fn feature_names(&self) -> &[String] {
        self.extractor.feature_names()
    }

    /// Encode, reorder, scale and classify one record
    pub fn predict(&self, record: &TransactionInput) -> AppResult<Prediction> {
        let processed = self.extractor.extract(record)?;
        let scaled = self.bundle.scaler.transform(&processed)?;

        let label = self.bundle.model.predict(&scaled);
        let probabilities = self.bundle.model.predict_proba(&scaled);

        debug!(
            model = self.bundle.model.name(),
            label = label,
            fraud_probability = probabilities[FRAUD_CLASS],
            "Prediction complete"
        );

        Ok(Prediction {
            label,
            probabilities,
            processed,
            scaled,
        })
    }

    /// Attribute the fraud-class score of a prediction to its features.
    ///
    /// Contributions are labelled with the pre-scaling values.
    pub fn explain(&self, prediction: &Prediction) -> AppResult<Explanation> {
        let expected = self.extractor.feature_count();
        if prediction.scaled.len() != expected || prediction.processed.len() != expected {
            return Err(AppError::ShapeMismatch {
                expected,
                actual: prediction.scaled.len(),
            });
        }

        let attribution = self.bundle.explainer.explain(&prediction.scaled);
        let (base_value, values) = attribution.for_class(FRAUD_CLASS);

        let contributions = self
            .feature_names()
            .iter()
            .zip(values)
            .zip(&prediction.processed)
            .map(|((feature, contribution), value)| FeatureContribution {
                feature: feature.clone(),
                value: *value,
                contribution,
            })
            .collect();

        Ok(Explanation {
            base_value,
            contributions,
        })
    }

    /// Model score the explanation adds up to (probability or log-odds)
    pub fn raw_score(&self, prediction: &Prediction) -> f64 {
        self.bundle.model.raw_output(&prediction.scaled)[FRAUD_CLASS]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifacts::tests::forest_bundle;
    use crate::models::artifacts::ArtifactBundle;
    use crate::types::record::{KycStatus, TransactionCategory, TransactionMethod};

    fn engine(with_vocabulary: bool) -> InferenceEngine {
        InferenceEngine::new(Arc::new(forest_bundle(with_vocabulary)))
    }

    fn risky() -> TransactionInput {
        TransactionInput {
            kyc_status: KycStatus::Incomplete,
            days_since_kyc_incomplete: 120,
            transaction_amount: 150000.0,
            transaction_method: TransactionMethod::Online,
            transaction_category: TransactionCategory::Loan,
            suspicion_indicator: 1,
            ..TransactionInput::default()
        }
    }

    #[test]
    fn test_default_scenario() {
        let engine = engine(false);
        let prediction = engine.predict(&TransactionInput::default()).unwrap();
        assert!(prediction.label <= 1);
        let total: f64 = prediction.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(prediction.label, 0);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let engine = engine(false);
        let first = engine.predict(&risky()).unwrap();
        for _ in 0..5 {
            let again = engine.predict(&risky()).unwrap();
            assert_eq!(again.label, first.label);
            assert_eq!(again.probabilities, first.probabilities);
        }
    }

    #[test]
    fn test_per_call_encoding_hides_kyc_status() {
        // with a one-row fit "incomplete" encodes to 0, same as "complete"
        let engine = engine(false);
        let prediction = engine.predict(&risky()).unwrap();
        assert_eq!(prediction.processed[1], 0.0);
    }

    #[test]
    fn test_vocabulary_encoding_uses_training_codes() {
        let engine = engine(true);
        let prediction = engine.predict(&risky()).unwrap();
        assert_eq!(prediction.processed[1], 1.0);
        assert_eq!(prediction.processed[4], 2.0); // online
        assert_eq!(prediction.processed[5], 1.0); // loan
        assert!(prediction.is_fraud());
    }

    #[test]
    fn test_explanation_completeness() {
        let engine = engine(true);
        for record in [TransactionInput::default(), risky()] {
            let prediction = engine.predict(&record).unwrap();
            let explanation = engine.explain(&prediction).unwrap();

            assert_eq!(explanation.contributions.len(), engine.feature_names().len());
            assert!((explanation.output_value() - engine.raw_score(&prediction)).abs() < 1e-9);
            assert!((explanation.output_value() - prediction.fraud_probability()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_contributions_labelled_with_unscaled_values() {
        let engine = engine(false);
        let prediction = engine.predict(&risky()).unwrap();
        let explanation = engine.explain(&prediction).unwrap();
        let amount = explanation
            .contributions
            .iter()
            .find(|c| c.feature == "transaction_amount")
            .unwrap();
        assert_eq!(amount.value, 150000.0);
        assert!(amount.contribution > 0.0);
    }

    #[test]
    fn test_logistic_bundle() {
        let json = r#"{
            "features": ["transaction_amount", "suspicion_indicator"],
            "scaler": {"type": "standard", "mean": [5000, 0], "scale": [10000, 1]},
            "model": {"type": "logistic_regression", "coef": [1.5, 2.0], "intercept": -2.0},
            "explainer": {"algorithm": "linear"}
        }"#;
        let bundle = ArtifactBundle::from_slice(json.as_bytes()).unwrap();
        let engine = InferenceEngine::new(Arc::new(bundle));

        let prediction = engine.predict(&TransactionInput::default()).unwrap();
        assert_eq!(prediction.scaled, vec![0.0, 0.0]);
        assert_eq!(prediction.label, 0);

        let explanation = engine.explain(&prediction).unwrap();
        assert_eq!(explanation.base_value, -2.0);
        assert!((explanation.output_value() - engine.raw_score(&prediction)).abs() < 1e-12);
    }

    #[test]
    fn test_explain_rejects_foreign_prediction() {
        let engine = engine(false);
        let prediction = Prediction {
            label: 0,
            probabilities: [1.0, 0.0],
            processed: vec![0.0; 3],
            scaled: vec![0.0; 3],
        };
        assert!(matches!(
            engine.explain(&prediction),
            Err(AppError::ShapeMismatch {
                expected: 11,
                actual: 3
            })
        ));
    }
}
