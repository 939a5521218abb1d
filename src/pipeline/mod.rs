//! Batch Analytics Pipeline
//!
//! Orchestrates one deterministic pass over a loaded booking table:
//!
//! 1. Quality assessment and remediation
//! 2. Feature engineering
//! 3. Hypothesis catalog + model training (independent consumers of the same
//!    immutable feature table, run side by side)
//! 4. Insight synthesis
//!
//! The bundle is best-effort partial: a model that cannot train degrades to
//! `None` with a warning while hypotheses, quality report and the other
//! model remain valid. Only schema-level failures abort the run.

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::features::FeatureEngineer;
use crate::hypothesis::HypothesisEngine;
use crate::insight::InsightSynthesizer;
use crate::loader::SchemaError;
use crate::model::{DataInsufficientError, ModelPipeline, TrainedModel};
use crate::quality::QualityAssessor;
use crate::types::{FeatureRecord, HypothesisResult, QualityReport, RawRecord, Recommendation};

/// Everything one pipeline run produces. Owned by the engine for the
/// lifetime of one loaded dataset; callers receive read-only views.
#[derive(Debug)]
pub struct AnalyticsBundle {
    pub quality: QualityReport,
    pub features: Vec<FeatureRecord>,
    /// The ten catalog results, in H1..H10 order.
    pub hypotheses: Vec<HypothesisResult>,
    /// Absent when training failed; the failure is recorded alongside.
    pub revenue_model: Option<TrainedModel>,
    pub rating_model: Option<TrainedModel>,
    pub revenue_model_error: Option<DataInsufficientError>,
    pub rating_model_error: Option<DataInsufficientError>,
    pub recommendations: Vec<Recommendation>,
}

/// Single-pass batch pipeline over an in-memory table.
pub struct AnalyticsPipeline;

impl AnalyticsPipeline {
    /// Run the full pipeline.
    ///
    /// Fails only on schema-level problems; every other failure degrades to
    /// a partial bundle so a dashboard can render what remains.
    pub fn run(
        records: &[RawRecord],
        config: &EngineConfig,
    ) -> Result<AnalyticsBundle, SchemaError> {
        info!(rows = records.len(), "starting analytics pass");

        let quality = QualityAssessor::assess(records, config)?;
        let clean = QualityAssessor::remediate(records, &quality);
        let features = FeatureEngineer::engineer(&clean);

        // Hypotheses and the two trainings read the same immutable feature
        // table and share no accumulator state, so they run side by side.
        let (hypotheses, (revenue, rating)) = rayon::join(
            || HypothesisEngine::run_catalog(&features, config),
            || {
                rayon::join(
                    || ModelPipeline::train_revenue_model(&features, config),
                    || ModelPipeline::train_rating_model(&features, config),
                )
            },
        );

        let (revenue_model, revenue_model_error) = split_training_result("revenue", revenue);
        let (rating_model, rating_model_error) = split_training_result("rating", rating);

        let recommendations = InsightSynthesizer::synthesize(
            &hypotheses,
            revenue_model.as_ref(),
            rating_model.as_ref(),
        );

        info!(
            significant = hypotheses.iter().filter(|h| h.is_significant()).count(),
            revenue_model = revenue_model.is_some(),
            rating_model = rating_model.is_some(),
            recommendations = recommendations.len(),
            "analytics pass complete"
        );

        Ok(AnalyticsBundle {
            quality,
            features,
            hypotheses,
            revenue_model,
            rating_model,
            revenue_model_error,
            rating_model_error,
            recommendations,
        })
    }
}

fn split_training_result(
    name: &str,
    result: Result<TrainedModel, DataInsufficientError>,
) -> (Option<TrainedModel>, Option<DataInsufficientError>) {
    match result {
        Ok(model) => (Some(model), None),
        Err(err) => {
            warn!(model = name, error = %err, "model training skipped");
            (None, Some(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn synthetic_records(n: usize) -> Vec<RawRecord> {
        let vehicles = ["Go Mini", "Premier Sedan", "Auto"];
        let payments = ["Cash", "UPI"];
        (0..n)
            .map(|i| {
                let distance = 2.0 + (i % 20) as f64;
                let completed = i % 10 != 0;
                RawRecord {
                    booking_id: format!("B-{i}"),
                    timestamp: NaiveDate::from_ymd_opt(2024, 1 + (i % 12) as u32, 1 + (i % 28) as u32)
                        .unwrap()
                        .and_hms_opt((i % 24) as u32, 15, 0),
                    booking_status: Some(if completed {
                        "Completed".to_string()
                    } else {
                        "Cancelled by Driver".to_string()
                    }),
                    vehicle_type: Some(vehicles[i % vehicles.len()].to_string()),
                    payment_method: Some(payments[i % payments.len()].to_string()),
                    pickup_location: Some("A".to_string()),
                    drop_location: Some("B".to_string()),
                    ride_distance: Some(distance),
                    booking_value: Some(25.0 + distance * 11.0),
                    driver_ratings: Some(3.0 + (i % 20) as f64 * 0.1),
                    customer_rating: Some(3.5 + (i % 15) as f64 * 0.1),
                    avg_vtat: Some(4.0 + (i % 12) as f64),
                    avg_ctat: Some(12.0 + (i % 25) as f64),
                }
            })
            .collect()
    }

    fn test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.model.n_estimators = 10;
        config.model.min_training_rows = 100;
        config
    }

    #[test]
    fn full_pass_produces_a_complete_bundle() {
        let records = synthetic_records(400);
        let bundle = AnalyticsPipeline::run(&records, &test_config()).unwrap();

        assert_eq!(bundle.features.len(), 400);
        assert_eq!(bundle.hypotheses.len(), 10);
        assert!(bundle.revenue_model.is_some());
        assert!(bundle.rating_model.is_some());
        assert!(bundle.revenue_model_error.is_none());
        assert!(!bundle.recommendations.is_empty());
    }

    #[test]
    fn small_table_degrades_to_partial_bundle() {
        // Enough rows for hypotheses, too few for training
        let records = synthetic_records(60);
        let bundle = AnalyticsPipeline::run(&records, &test_config()).unwrap();

        assert_eq!(bundle.hypotheses.len(), 10);
        assert!(bundle.revenue_model.is_none());
        assert!(bundle.rating_model.is_none());
        assert!(bundle.revenue_model_error.is_some());
        // Hypothesis-driven recommendations can still appear
        assert!(bundle
            .recommendations
            .iter()
            .all(|r| r.source.starts_with('H')));
    }

    #[test]
    fn empty_table_is_a_schema_error() {
        let err = AnalyticsPipeline::run(&[], &test_config()).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyTable));
    }
}
