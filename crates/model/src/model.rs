//! Linear sales model
//!
//! Holds the coefficients produced by ordinary least squares over the encoded
//! feature matrix. Training lives in `choco-trainer`; this type only evaluates.

use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::serialization::canonical_json_string;

/// Artifact format version written by the trainer
pub const MODEL_FORMAT_VERSION: &str = "1.0.0";

/// Descriptive metadata stored with the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    /// Unix timestamp (seconds) of training
    pub created_at: i64,
    pub training_rows: usize,
}

/// `amount = intercept + Σ coefficients[i] * features[i]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub metadata: ModelMetadata,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, training_rows: usize) -> Result<Self> {
        let model = Self {
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            coefficients,
            intercept,
            metadata: ModelMetadata {
                version: MODEL_FORMAT_VERSION.to_string(),
                created_at: chrono::Utc::now().timestamp(),
                training_rows,
            },
        };
        model.validate()?;
        Ok(model)
    }

    /// Predicted amount for one encoded order
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(features.as_slice())
            .fold(self.intercept, |acc, (coef, value)| acc + coef * value)
    }

    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::InvalidModel(format!(
                "expected {} coefficients, found {}",
                FEATURE_COUNT,
                self.coefficients.len()
            )));
        }
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelError::InvalidModel(format!(
                "feature layout {:?} does not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidModel(
                "non-finite coefficient or intercept".to_string(),
            ));
        }
        Ok(())
    }

    /// BLAKE3 digest (hex) of the canonical JSON form
    pub fn model_hash(&self) -> Result<String> {
        let canonical = canonical_json_string(self)?;
        Ok(hex::encode(blake3::hash(canonical.as_bytes()).as_bytes()))
    }
}

/// Round a predicted amount to cents, ties to even
pub fn round_score(amount: f64) -> f64 {
    (amount * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearModel {
        LinearModel::new(vec![10.0, -5.0, 2.5, 1.5], 100.0, 8).unwrap()
    }

    #[test]
    fn test_predict_is_affine() {
        let prediction = model().predict(&FeatureVector([1.0, 2.0, 4.0, 10.0]));
        // 100 + 10 - 10 + 10 + 15
        assert_eq!(prediction, 125.0);
    }

    #[test]
    fn test_rejects_wrong_coefficient_count() {
        assert!(LinearModel::new(vec![1.0, 2.0], 0.0, 1).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(LinearModel::new(vec![f64::NAN, 0.0, 0.0, 0.0], 0.0, 1).is_err());
    }

    #[test]
    fn test_hash_is_stable() {
        let model = model();
        let clone = model.clone();
        assert_eq!(model.model_hash().unwrap(), clone.model_hash().unwrap());
        assert_eq!(model.model_hash().unwrap().len(), 64);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(1234.5678), 1234.57);
        assert_eq!(round_score(-10.004), -10.0);
    }

    #[test]
    fn test_round_score_ties_go_to_even() {
        assert_eq!(round_score(0.125), 0.12);
        assert_eq!(round_score(1234.125), 1234.12);
        assert_eq!(round_score(0.375), 0.38);
        assert_eq!(round_score(-0.125), -0.12);
    }
}
