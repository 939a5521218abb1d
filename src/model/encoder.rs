//! Stable categorical encoding for model features.
//!
//! Each distinct category maps to an integer code fixed at training time, in
//! first-seen order. The encoder is retained alongside the trained model so
//! inference uses the identical mapping; a category unseen during training
//! is an explicit error, never silently coerced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inference-time category outside the training-time mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("category `{value}` for feature `{feature}` was not seen during training")]
pub struct EncodingError {
    pub feature: String,
    pub value: String,
}

/// Label-to-code mapping for one categorical feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    feature: String,
    /// Code = index; first-seen order, fixed for the model's lifetime.
    labels: Vec<String>,
}

impl CategoryEncoder {
    /// Learn the mapping from training values, first-seen order.
    pub fn fit<'a>(feature: &str, values: impl Iterator<Item = &'a str>) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for value in values {
            if !labels.iter().any(|l| l == value) {
                labels.push(value.to_string());
            }
        }
        Self {
            feature: feature.to_string(),
            labels,
        }
    }

    /// Encode one value, failing on categories outside the mapping.
    pub fn encode(&self, value: &str) -> Result<f64, EncodingError> {
        self.labels
            .iter()
            .position(|l| l == value)
            .map(|code| code as f64)
            .ok_or_else(|| EncodingError {
                feature: self.feature.clone(),
                value: value.to_string(),
            })
    }

    /// Number of distinct categories seen during training.
    pub fn cardinality(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_first_seen_order() {
        let values = ["Sedan", "Auto", "Sedan", "Bike", "Auto"];
        let encoder = CategoryEncoder::fit("vehicle_type", values.into_iter());

        assert_eq!(encoder.cardinality(), 3);
        assert_eq!(encoder.encode("Sedan").unwrap(), 0.0);
        assert_eq!(encoder.encode("Auto").unwrap(), 1.0);
        assert_eq!(encoder.encode("Bike").unwrap(), 2.0);
    }

    #[test]
    fn unseen_category_is_an_error() {
        let encoder = CategoryEncoder::fit("vehicle_type", ["Sedan", "Auto"].into_iter());
        let err = encoder.encode("Helicopter").unwrap_err();
        assert_eq!(err.feature, "vehicle_type");
        assert_eq!(err.value, "Helicopter");
    }

    #[test]
    fn refit_on_same_data_is_identical() {
        let values = ["UPI", "Cash", "UPI", "Credit Card"];
        let a = CategoryEncoder::fit("payment_method", values.into_iter());
        let b = CategoryEncoder::fit("payment_method", values.into_iter());
        assert_eq!(a, b);
    }
}
