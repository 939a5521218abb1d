//! Model pipeline types: metrics, importances, predictions.

use serde::{Deserialize, Serialize};

use super::record::RatingCategory;

/// Which prediction task a trained model serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTask {
    /// Booking-value regression.
    Regression,
    /// Driver-rating-category classification.
    Classification,
}

/// Held-out and train-partition metrics for the revenue regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub train_r2: f64,
    pub test_r2: f64,
    pub train_rmse: f64,
    pub test_rmse: f64,
    pub train_mae: f64,
    pub test_mae: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Per-class breakdown for the rating classifier.
///
/// The class distribution is heavily skewed toward High, so aggregate
/// accuracy alone under-reports failures on the Low class. Consumers must
/// read this breakdown alongside the accuracy number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: RatingCategory,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// True instances of the class in the held-out partition.
    pub support: usize,
}

/// Held-out and train-partition metrics for the rating classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub train_samples: usize,
    pub test_samples: usize,
    /// One entry per rating category, in Low/Medium/High order.
    pub per_class: Vec<ClassReport>,
}

/// Evaluation metrics for either task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelMetrics {
    Regression(RegressionMetrics),
    Classification(ClassificationMetrics),
}

/// Normalized impurity-reduction contribution of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// In [0, 1]; sums to 1.0 across all features of a model.
    pub importance: f64,
}

/// Classifier prediction: the winning category plus per-class probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    pub category: RatingCategory,
    /// One entry per rating category, in Low/Medium/High order; sums to 1.0.
    pub probabilities: Vec<(RatingCategory, f64)>,
}
