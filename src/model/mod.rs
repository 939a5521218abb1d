//! Model Pipeline
//!
//! Encodes, splits, trains and evaluates the two predictive models:
//! - revenue: ensemble regression over decision trees (booking value)
//! - rating: ensemble classification over decision trees (Low/Medium/High
//!   driver rating), stratified split to preserve the skewed class mix
//!
//! Both models consume the same fixed 11-feature set. Categorical encodings
//! are learned at training time and retained on the `TrainedModel`; an
//! unseen category at inference is an `EncodingError`, never a silent
//! coercion. All randomized steps derive from the configured seed, so a
//! fixed seed reproduces identical metrics run over run.

pub mod encoder;
pub mod forest;
pub mod metrics;
pub mod split;
pub mod tree;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::types::{
    ClassPrediction, ClassificationMetrics, FeatureImportance, FeatureRecord, ModelMetrics,
    ModelTask, RatingCategory, RegressionMetrics,
};

pub use encoder::{CategoryEncoder, EncodingError};
use forest::{ForestParams, RandomForest};
use tree::TreeTask;

/// The fixed model feature set, in matrix column order.
pub const MODEL_FEATURES: [&str; 11] = [
    "hour",
    "day_of_week",
    "month",
    "is_weekend",
    "is_peak_morning",
    "is_peak_evening",
    "ride_distance",
    "avg_vtat",
    "avg_ctat",
    "vehicle_type",
    "payment_method",
];

/// Training set too small after target filtering. Fatal to the one training
/// call only; other pipeline outputs remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("training set too small: {rows} usable rows, need at least {required}")]
pub struct DataInsufficientError {
    pub rows: usize,
    pub required: usize,
}

/// One feature vector for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub hour: u32,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub is_peak_morning: bool,
    pub is_peak_evening: bool,
    pub ride_distance: f64,
    pub avg_vtat: f64,
    pub avg_ctat: f64,
    pub vehicle_type: String,
    pub payment_method: String,
}

/// Inference output for either task.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// Predicted booking value.
    Value(f64),
    /// Predicted rating category with per-class probabilities.
    Class(ClassPrediction),
}

/// A trained model handle: fitted forest, retained encoders, evaluation
/// metrics and normalized feature importances. Superseded, never mutated,
/// by a subsequent training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub task: ModelTask,
    /// Feature names in matrix column order.
    pub feature_names: Vec<String>,
    pub metrics: ModelMetrics,
    /// Sorted by importance, descending; values sum to 1.0.
    pub importances: Vec<FeatureImportance>,
    forest: RandomForest,
    vehicle_encoder: CategoryEncoder,
    payment_encoder: CategoryEncoder,
}

impl TrainedModel {
    /// Predict for one feature vector.
    ///
    /// Fails with `EncodingError` when the vehicle type or payment method
    /// lies outside the training-time category mapping.
    pub fn predict(&self, input: &ModelInput) -> Result<Prediction, EncodingError> {
        let row = self.encode_input(input)?;
        match self.task {
            ModelTask::Regression => Ok(Prediction::Value(self.forest.predict(&row))),
            ModelTask::Classification => {
                let probabilities = self.forest.predict_proba(&row);
                let class_idx = self.forest.predict_class(&row);
                Ok(Prediction::Class(ClassPrediction {
                    category: RatingCategory::ALL[class_idx],
                    probabilities: RatingCategory::ALL
                        .iter()
                        .copied()
                        .zip(probabilities)
                        .collect(),
                }))
            }
        }
    }

    fn encode_input(&self, input: &ModelInput) -> Result<Vec<f64>, EncodingError> {
        Ok(vec![
            f64::from(input.hour),
            f64::from(input.day_of_week),
            f64::from(input.month),
            f64::from(u8::from(input.is_weekend)),
            f64::from(u8::from(input.is_peak_morning)),
            f64::from(u8::from(input.is_peak_evening)),
            input.ride_distance,
            input.avg_vtat,
            input.avg_ctat,
            self.vehicle_encoder.encode(&input.vehicle_type)?,
            self.payment_encoder.encode(&input.payment_method)?,
        ])
    }
}

/// Trains the revenue and rating models from the engineered feature table.
pub struct ModelPipeline;

impl ModelPipeline {
    /// Train the booking-value regressor.
    pub fn train_revenue_model(
        features: &[FeatureRecord],
        config: &EngineConfig,
    ) -> Result<TrainedModel, DataInsufficientError> {
        let rows: Vec<&FeatureRecord> = features
            .iter()
            .filter(|f| has_model_features(f) && f.booking_value.is_some())
            .collect();
        Self::check_viability(rows.len(), config)?;

        let (x, vehicle_encoder, payment_encoder) = encode_matrix(&rows);
        let y: Vec<f64> = rows
            .iter()
            .map(|f| f.booking_value.expect("filtered on booking_value"))
            .collect();

        let (train_idx, test_idx) =
            split::train_test_split(rows.len(), config.model.test_fraction, config.engine.seed);
        let (x_train, y_train) = subset(&x, &y, &train_idx);
        let (x_test, y_test) = subset(&x, &y, &test_idx);

        let forest = RandomForest::fit(
            &x_train,
            &y_train,
            TreeTask::Regression,
            &ForestParams {
                n_estimators: config.model.n_estimators,
                max_depth: config.model.max_depth,
                seed: config.engine.seed,
                max_features: None,
            },
        );

        let train_pred: Vec<f64> = x_train.iter().map(|r| forest.predict(r)).collect();
        let test_pred: Vec<f64> = x_test.iter().map(|r| forest.predict(r)).collect();

        let model_metrics = RegressionMetrics {
            train_r2: metrics::r2_score(&y_train, &train_pred),
            test_r2: metrics::r2_score(&y_test, &test_pred),
            train_rmse: metrics::rmse(&y_train, &train_pred),
            test_rmse: metrics::rmse(&y_test, &test_pred),
            train_mae: metrics::mae(&y_train, &train_pred),
            test_mae: metrics::mae(&y_test, &test_pred),
            train_samples: train_idx.len(),
            test_samples: test_idx.len(),
        };
        info!(
            rows = rows.len(),
            test_r2 = model_metrics.test_r2,
            test_rmse = model_metrics.test_rmse,
            "revenue model trained"
        );

        Ok(TrainedModel {
            task: ModelTask::Regression,
            feature_names: MODEL_FEATURES.iter().map(ToString::to_string).collect(),
            metrics: ModelMetrics::Regression(model_metrics),
            importances: ranked_importances(forest.importances()),
            forest,
            vehicle_encoder,
            payment_encoder,
        })
    }

    /// Train the driver-rating-category classifier.
    pub fn train_rating_model(
        features: &[FeatureRecord],
        config: &EngineConfig,
    ) -> Result<TrainedModel, DataInsufficientError> {
        let rows: Vec<&FeatureRecord> = features
            .iter()
            .filter(|f| has_model_features(f) && f.driver_rating_category.is_some())
            .collect();
        Self::check_viability(rows.len(), config)?;

        let (x, vehicle_encoder, payment_encoder) = encode_matrix(&rows);
        let labels: Vec<usize> = rows
            .iter()
            .map(|f| {
                let category = f
                    .driver_rating_category
                    .expect("filtered on driver_rating_category");
                class_index(category)
            })
            .collect();
        let y: Vec<f64> = labels.iter().map(|&l| l as f64).collect();

        let (train_idx, test_idx) =
            split::stratified_split(&labels, config.model.test_fraction, config.engine.seed);
        let (x_train, y_train) = subset(&x, &y, &train_idx);
        let (x_test, y_test) = subset(&x, &y, &test_idx);

        // sqrt-of-features subsampling per split, the classification default
        let max_features = (MODEL_FEATURES.len() as f64).sqrt().floor() as usize;
        let forest = RandomForest::fit(
            &x_train,
            &y_train,
            TreeTask::Classification {
                n_classes: RatingCategory::ALL.len(),
            },
            &ForestParams {
                n_estimators: config.model.n_estimators,
                max_depth: config.model.max_depth,
                seed: config.engine.seed,
                max_features: Some(max_features),
            },
        );

        let train_true: Vec<usize> = y_train.iter().map(|&v| v as usize).collect();
        let test_true: Vec<usize> = y_test.iter().map(|&v| v as usize).collect();
        let train_pred: Vec<usize> = x_train.iter().map(|r| forest.predict_class(r)).collect();
        let test_pred: Vec<usize> = x_test.iter().map(|r| forest.predict_class(r)).collect();

        let model_metrics = ClassificationMetrics {
            train_accuracy: metrics::accuracy(&train_true, &train_pred),
            test_accuracy: metrics::accuracy(&test_true, &test_pred),
            train_samples: train_idx.len(),
            test_samples: test_idx.len(),
            per_class: metrics::per_class_report(&test_true, &test_pred),
        };
        info!(
            rows = rows.len(),
            test_accuracy = model_metrics.test_accuracy,
            "rating model trained"
        );

        Ok(TrainedModel {
            task: ModelTask::Classification,
            feature_names: MODEL_FEATURES.iter().map(ToString::to_string).collect(),
            metrics: ModelMetrics::Classification(model_metrics),
            importances: ranked_importances(forest.importances()),
            forest,
            vehicle_encoder,
            payment_encoder,
        })
    }

    fn check_viability(rows: usize, config: &EngineConfig) -> Result<(), DataInsufficientError> {
        let required = config.model.min_training_rows;
        if rows < required {
            debug!(rows, required, "training aborted: not enough usable rows");
            return Err(DataInsufficientError { rows, required });
        }
        Ok(())
    }
}

/// Class index of a rating category in `RatingCategory::ALL` order.
fn class_index(category: RatingCategory) -> usize {
    RatingCategory::ALL
        .iter()
        .position(|&c| c == category)
        .expect("category is one of ALL")
}

/// True when every one of the 11 model features is present on the row and the
/// ride completed (only completed rides carry a meaningful target).
fn has_model_features(f: &FeatureRecord) -> bool {
    f.is_completed
        && f.hour.is_some()
        && f.day_of_week.is_some()
        && f.month.is_some()
        && f.ride_distance.is_some()
        && f.avg_vtat.is_some()
        && f.avg_ctat.is_some()
        && f.vehicle_type.is_some()
        && f.payment_method.is_some()
}

/// Fit both encoders over the usable rows and build the feature matrix.
fn encode_matrix(rows: &[&FeatureRecord]) -> (Vec<Vec<f64>>, CategoryEncoder, CategoryEncoder) {
    let vehicle_encoder = CategoryEncoder::fit(
        "vehicle_type",
        rows.iter().filter_map(|f| f.vehicle_type.as_deref()),
    );
    let payment_encoder = CategoryEncoder::fit(
        "payment_method",
        rows.iter().filter_map(|f| f.payment_method.as_deref()),
    );

    let x: Vec<Vec<f64>> = rows
        .iter()
        .map(|f| {
            vec![
                f64::from(f.hour.expect("filtered on hour")),
                f64::from(f.day_of_week.expect("filtered on day_of_week")),
                f64::from(f.month.expect("filtered on month")),
                f64::from(u8::from(f.is_weekend)),
                f64::from(u8::from(f.is_peak_morning)),
                f64::from(u8::from(f.is_peak_evening)),
                f.ride_distance.expect("filtered on ride_distance"),
                f.avg_vtat.expect("filtered on avg_vtat"),
                f.avg_ctat.expect("filtered on avg_ctat"),
                vehicle_encoder
                    .encode(f.vehicle_type.as_deref().expect("filtered on vehicle_type"))
                    .expect("encoder fitted from these rows"),
                payment_encoder
                    .encode(
                        f.payment_method
                            .as_deref()
                            .expect("filtered on payment_method"),
                    )
                    .expect("encoder fitted from these rows"),
            ]
        })
        .collect();

    (x, vehicle_encoder, payment_encoder)
}

/// Row/target subsets for a partition.
fn subset(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let xs = indices.iter().map(|&i| x[i].clone()).collect();
    let ys = indices.iter().map(|&i| y[i]).collect();
    (xs, ys)
}

/// Importances mapped to names and ranked descending.
fn ranked_importances(raw: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = MODEL_FEATURES
        .iter()
        .zip(raw)
        .map(|(feature, &importance)| FeatureImportance {
            feature: (*feature).to_string(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureEngineer;
    use crate::types::RawRecord;
    use chrono::NaiveDate;

    /// Synthetic completed rides where booking value tracks distance and the
    /// driver rating category tracks VTAT.
    fn synthetic_features(n: usize) -> Vec<FeatureRecord> {
        let vehicles = ["Go Mini", "Premier Sedan", "Auto", "Bike"];
        let payments = ["Cash", "UPI", "Credit Card"];
        let records: Vec<RawRecord> = (0..n)
            .map(|i| {
                let distance = 2.0 + (i % 23) as f64;
                let vtat = 3.0 + (i % 17) as f64;
                // Long waits drag the rating down into Low territory
                let rating = (4.8 - vtat * 0.2).clamp(0.5, 5.0);
                RawRecord {
                    booking_id: format!("B-{i}"),
                    timestamp: NaiveDate::from_ymd_opt(2024, 1 + (i % 12) as u32, 1 + (i % 28) as u32)
                        .unwrap()
                        .and_hms_opt((i % 24) as u32, 30, 0),
                    booking_status: Some("Completed".to_string()),
                    vehicle_type: Some(vehicles[i % vehicles.len()].to_string()),
                    payment_method: Some(payments[i % payments.len()].to_string()),
                    pickup_location: Some("A".to_string()),
                    drop_location: Some("B".to_string()),
                    ride_distance: Some(distance),
                    booking_value: Some(30.0 + distance * 12.0 + (i % 5) as f64),
                    driver_ratings: Some(rating),
                    customer_rating: Some(4.0),
                    avg_vtat: Some(vtat),
                    avg_ctat: Some(10.0 + (i % 31) as f64),
                }
            })
            .collect();
        FeatureEngineer::engineer(&records)
    }

    fn small_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.model.n_estimators = 15;
        config.model.min_training_rows = 50;
        config
    }

    #[test]
    fn revenue_model_learns_the_distance_signal() {
        let features = synthetic_features(400);
        let config = small_config();
        let model = ModelPipeline::train_revenue_model(&features, &config).unwrap();

        let ModelMetrics::Regression(metrics) = &model.metrics else {
            panic!("expected regression metrics");
        };
        assert!(metrics.test_r2 > 0.8, "test R² = {}", metrics.test_r2);
        assert_eq!(metrics.train_samples + metrics.test_samples, 400);

        // Distance dominates the fare in this synthetic table
        assert_eq!(model.importances[0].feature, "ride_distance");
    }

    #[test]
    fn importances_sum_to_one_for_both_models() {
        let features = synthetic_features(300);
        let config = small_config();

        for model in [
            ModelPipeline::train_revenue_model(&features, &config).unwrap(),
            ModelPipeline::train_rating_model(&features, &config).unwrap(),
        ] {
            let sum: f64 = model.importances.iter().map(|fi| fi.importance).sum();
            assert!((sum - 1.0).abs() < 1e-6, "importance sum {sum}");
        }
    }

    #[test]
    fn repeated_training_reproduces_metrics() {
        let features = synthetic_features(300);
        let config = small_config();

        let a = ModelPipeline::train_revenue_model(&features, &config).unwrap();
        let b = ModelPipeline::train_revenue_model(&features, &config).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.importances, b.importances);

        let a = ModelPipeline::train_rating_model(&features, &config).unwrap();
        let b = ModelPipeline::train_rating_model(&features, &config).unwrap();
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn too_few_rows_is_data_insufficient() {
        let features = synthetic_features(30);
        let config = small_config();
        let err = ModelPipeline::train_revenue_model(&features, &config).unwrap_err();
        assert_eq!(
            err,
            DataInsufficientError {
                rows: 30,
                required: 50
            }
        );
    }

    #[test]
    fn cancelled_rides_are_excluded_from_training() {
        let mut features = synthetic_features(60);
        for f in features.iter_mut().skip(40) {
            f.is_completed = false;
            f.is_cancelled = true;
        }
        let config = small_config();
        let err = ModelPipeline::train_revenue_model(&features, &config).unwrap_err();
        assert_eq!(err.rows, 40);
    }

    #[test]
    fn unseen_vehicle_type_raises_encoding_error() {
        let features = synthetic_features(200);
        let config = small_config();
        let model = ModelPipeline::train_revenue_model(&features, &config).unwrap();

        let mut input = ModelInput {
            hour: 9,
            day_of_week: 2,
            month: 6,
            is_weekend: false,
            is_peak_morning: true,
            is_peak_evening: false,
            ride_distance: 8.0,
            avg_vtat: 6.0,
            avg_ctat: 26.0,
            vehicle_type: "Go Mini".to_string(),
            payment_method: "Cash".to_string(),
        };
        assert!(model.predict(&input).is_ok());

        input.vehicle_type = "Hovercraft".to_string();
        let err = model.predict(&input).unwrap_err();
        assert_eq!(err.feature, "vehicle_type");
        assert_eq!(err.value, "Hovercraft");
    }

    #[test]
    fn classifier_reports_per_class_breakdown() {
        let features = synthetic_features(400);
        let config = small_config();
        let model = ModelPipeline::train_rating_model(&features, &config).unwrap();

        let ModelMetrics::Classification(metrics) = &model.metrics else {
            panic!("expected classification metrics");
        };
        assert_eq!(metrics.per_class.len(), 3);
        assert_eq!(metrics.per_class[0].class, RatingCategory::Low);
        let total_support: usize = metrics.per_class.iter().map(|c| c.support).sum();
        assert_eq!(total_support, metrics.test_samples);
    }

    #[test]
    fn classifier_prediction_carries_probabilities() {
        let features = synthetic_features(300);
        let config = small_config();
        let model = ModelPipeline::train_rating_model(&features, &config).unwrap();

        let input = ModelInput {
            hour: 9,
            day_of_week: 2,
            month: 6,
            is_weekend: false,
            is_peak_morning: true,
            is_peak_evening: false,
            ride_distance: 8.0,
            avg_vtat: 4.0,
            avg_ctat: 26.0,
            vehicle_type: "Go Mini".to_string(),
            payment_method: "Cash".to_string(),
        };
        let Prediction::Class(prediction) = model.predict(&input).unwrap() else {
            panic!("expected a class prediction");
        };
        assert_eq!(prediction.probabilities.len(), 3);
        let total: f64 = prediction.probabilities.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
