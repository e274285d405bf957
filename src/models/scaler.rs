//! Numeric feature scaling fitted at training time

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A fitted scaler, applied column-wise in feature order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let (a, b) = match self {
            Scaler::Standard { mean, scale } => (mean.len(), scale.len()),
            Scaler::MinMax { min, scale } => (min.len(), scale.len()),
        };
        if a != b {
            return Err(format!("scaler parameter lengths differ ({} vs {})", a, b));
        }
        Ok(())
    }

    /// Scale one row
    pub fn transform(&self, row: &[f64]) -> AppResult<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(AppError::ShapeMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => row
                .iter()
                .zip(mean.iter().zip(scale))
                // zero-variance columns are fitted with scale 1
                .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
                .collect(),
            Scaler::MinMax { min, scale } => row
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.0],
        };
        assert_eq!(scaler.transform(&[14.0, 3.0]).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_min_max_scaling() {
        let scaler = Scaler::MinMax {
            min: vec![-1.0],
            scale: vec![0.5],
        };
        assert_eq!(scaler.transform(&[4.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let err = scaler.transform(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            AppError::ShapeMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_deserialize_tagged() {
        let scaler: Scaler =
            serde_json::from_str(r#"{"type":"standard","mean":[1.0],"scale":[2.0]}"#).unwrap();
        assert_eq!(scaler.n_features(), 1);
        assert!(scaler.validate().is_ok());
    }
}
