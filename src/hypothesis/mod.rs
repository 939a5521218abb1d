//! Hypothesis Testing Engine
//!
//! Runs the fixed catalog of statistical tests against the engineered
//! feature table. Test selection is rule-based per spec kind:
//! - two groups, continuous outcome: independent two-sample t-test
//! - three or more groups, continuous outcome: one-way ANOVA
//! - two continuous variables: Pearson correlation with significance test
//!
//! A group below the minimum observation count yields an
//! `InsufficientData` outcome for that one hypothesis; a batch run over the
//! whole catalog never aborts on one bad group. Significance uses a fixed
//! α per test with no multiple-comparison correction — callers needing
//! family-wise control post-process the result sequence themselves.

pub mod catalog;

use tracing::debug;

use crate::config::EngineConfig;
use crate::stats::{correlation_test, one_way_anova, two_sample_ttest};
use crate::types::quality_thresholds::{MIN_CORRELATION_SAMPLES, MIN_GROUP_OBSERVATIONS};
use crate::types::{
    EffectMeasure, EffectSize, FeatureRecord, HypothesisResult, HypothesisSpec, Strength,
    TestKind, TestOutcome,
};

use catalog::SampleSet;

/// Rule-based hypothesis test runner.
pub struct HypothesisEngine;

impl HypothesisEngine {
    /// Run the full fixed catalog (H1-H10) in id order.
    pub fn run_catalog(
        features: &[FeatureRecord],
        config: &EngineConfig,
    ) -> Vec<HypothesisResult> {
        Self::run_all(&catalog::specs(), features, config)
    }

    /// Run a sequence of specs; result order matches input spec order.
    pub fn run_all(
        specs: &[HypothesisSpec],
        features: &[FeatureRecord],
        config: &EngineConfig,
    ) -> Vec<HypothesisResult> {
        let results: Vec<HypothesisResult> = specs
            .iter()
            .map(|spec| Self::run(spec, features, config))
            .collect();

        let significant = results.iter().filter(|r| r.is_significant()).count();
        debug!(
            total = results.len(),
            significant, "hypothesis catalog complete"
        );
        results
    }

    /// Run one hypothesis test.
    pub fn run(
        spec: &HypothesisSpec,
        features: &[FeatureRecord],
        config: &EngineConfig,
    ) -> HypothesisResult {
        let alpha = config.engine.alpha;
        let outcome = match catalog::extract(&spec.id, features) {
            Some(samples) => Self::evaluate(spec.kind, &samples, alpha),
            None => TestOutcome::InsufficientData {
                reason: format!("no extraction rule for hypothesis `{}`", spec.id),
            },
        };

        HypothesisResult {
            id: spec.id.clone(),
            statement: spec.statement.clone(),
            test_name: spec.kind.test_name().to_string(),
            group_variable: spec.group_variable.clone(),
            outcome_variable: spec.outcome_variable.clone(),
            outcome,
        }
    }

    fn evaluate(kind: TestKind, samples: &SampleSet, alpha: f64) -> TestOutcome {
        match (kind, samples) {
            (TestKind::TwoSample, SampleSet::TwoGroups { a, b }) => {
                Self::evaluate_two_sample(a, b, alpha)
            }
            (TestKind::MultiGroup, SampleSet::Groups(groups)) => {
                Self::evaluate_multi_group(groups, alpha)
            }
            (TestKind::Correlation, SampleSet::Paired { x, y }) => {
                Self::evaluate_correlation(x, y, alpha)
            }
            _ => TestOutcome::InsufficientData {
                reason: "sample shape does not match test kind".to_string(),
            },
        }
    }

    fn evaluate_two_sample(a: &[f64], b: &[f64], alpha: f64) -> TestOutcome {
        if a.len() < MIN_GROUP_OBSERVATIONS || b.len() < MIN_GROUP_OBSERVATIONS {
            return TestOutcome::InsufficientData {
                reason: format!(
                    "group sizes {} and {} below minimum {}",
                    a.len(),
                    b.len(),
                    MIN_GROUP_OBSERVATIONS
                ),
            };
        }
        match two_sample_ttest(a, b) {
            Some(test) => TestOutcome::Computed {
                statistic: test.statistic,
                p_value: test.p_value,
                significant: test.p_value < alpha,
                effect: EffectSize {
                    measure: EffectMeasure::CohensD,
                    value: test.cohen_d,
                    strength: Strength::from_cohen_d(test.cohen_d),
                },
            },
            None => TestOutcome::InsufficientData {
                reason: "two-sample test not computable".to_string(),
            },
        }
    }

    fn evaluate_multi_group(groups: &[(String, Vec<f64>)], alpha: f64) -> TestOutcome {
        // Degenerate groups carry no within-group variance; drop them rather
        // than letting one rare category void the whole comparison.
        let viable: Vec<Vec<f64>> = groups
            .iter()
            .filter(|(_, values)| values.len() >= MIN_GROUP_OBSERVATIONS)
            .map(|(_, values)| values.clone())
            .collect();

        if viable.len() < 2 {
            return TestOutcome::InsufficientData {
                reason: format!(
                    "{} of {} groups have at least {} observations",
                    viable.len(),
                    groups.len(),
                    MIN_GROUP_OBSERVATIONS
                ),
            };
        }

        match one_way_anova(&viable) {
            Some(test) => TestOutcome::Computed {
                statistic: test.statistic,
                p_value: test.p_value,
                significant: test.p_value < alpha,
                effect: EffectSize {
                    measure: EffectMeasure::EtaSquared,
                    value: test.eta_squared,
                    strength: Strength::from_eta_squared(test.eta_squared),
                },
            },
            None => TestOutcome::InsufficientData {
                reason: "one-way comparison not computable".to_string(),
            },
        }
    }

    fn evaluate_correlation(x: &[f64], y: &[f64], alpha: f64) -> TestOutcome {
        if x.len() < MIN_CORRELATION_SAMPLES {
            return TestOutcome::InsufficientData {
                reason: format!(
                    "{} paired observations below minimum {}",
                    x.len(),
                    MIN_CORRELATION_SAMPLES
                ),
            };
        }
        match correlation_test(x, y) {
            Some(test) => TestOutcome::Computed {
                // The coefficient doubles as the reported statistic
                statistic: test.r,
                p_value: test.p_value,
                significant: test.p_value < alpha,
                effect: EffectSize {
                    measure: EffectMeasure::PearsonR,
                    value: test.r,
                    strength: Strength::from_abs_r(test.r),
                },
            },
            None => TestOutcome::InsufficientData {
                reason: "correlation not computable".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureEngineer;
    use crate::types::RawRecord;
    use chrono::NaiveDate;

    fn make_record(
        id: usize,
        hour: u32,
        vehicle: &str,
        payment: &str,
        status: &str,
        distance: f64,
        value: f64,
        driver_rating: Option<f64>,
    ) -> RawRecord {
        RawRecord {
            booking_id: format!("B-{id}"),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1 + (id % 20) as u32)
                .unwrap()
                .and_hms_opt(hour, 5, 0),
            booking_status: Some(status.to_string()),
            vehicle_type: Some(vehicle.to_string()),
            payment_method: Some(payment.to_string()),
            pickup_location: Some("A".to_string()),
            drop_location: Some("B".to_string()),
            ride_distance: Some(distance),
            booking_value: Some(value),
            driver_ratings: driver_rating,
            customer_rating: Some(4.0 + (id % 5) as f64 * 0.2),
            avg_vtat: Some(5.0 + (id % 10) as f64),
            avg_ctat: Some(20.0 + (id % 15) as f64),
        }
    }

    /// A table where revenue is exactly 10x distance.
    fn proportional_table(n: usize) -> Vec<crate::types::FeatureRecord> {
        let records: Vec<RawRecord> = (0..n)
            .map(|i| {
                let distance = 1.0 + (i % 25) as f64;
                make_record(
                    i,
                    (i % 24) as u32,
                    if i % 2 == 0 { "Go Mini" } else { "Premier Sedan" },
                    if i % 2 == 0 { "Cash" } else { "UPI" },
                    "Completed",
                    distance,
                    distance * 10.0,
                    Some(3.5 + (i % 4) as f64 * 0.3),
                )
            })
            .collect();
        FeatureEngineer::engineer(&records)
    }

    #[test]
    fn run_all_preserves_spec_order() {
        let features = proportional_table(60);
        let config = EngineConfig::default();
        let results = HypothesisEngine::run_catalog(&features, &config);
        assert_eq!(results.len(), 10);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.id, format!("H{}", i + 1));
        }
    }

    #[test]
    fn exact_proportionality_is_a_strong_correlation() {
        // H3 on revenue = 10 x distance: r ≈ 1, p ≈ 0, bucket Strong
        let features = proportional_table(100);
        let config = EngineConfig::default();
        let specs = catalog::specs();
        let h3 = HypothesisEngine::run(&specs[2], &features, &config);

        match h3.outcome {
            TestOutcome::Computed {
                statistic,
                p_value,
                significant,
                effect,
            } => {
                assert!((statistic - 1.0).abs() < 1e-6, "r={statistic}");
                assert!(p_value < 1e-9);
                assert!(significant);
                assert_eq!(effect.strength, Strength::Strong);
                assert_eq!(effect.measure, EffectMeasure::PearsonR);
            }
            TestOutcome::InsufficientData { reason } => {
                panic!("H3 should be computable: {reason}")
            }
        }
    }

    #[test]
    fn singleton_group_yields_insufficient_data() {
        // One premium ride against many non-premium rides: H1 cannot run
        let records: Vec<RawRecord> = (0..30)
            .map(|i| {
                let vehicle = if i == 0 { "Premier Sedan" } else { "Go Mini" };
                make_record(i, 9, vehicle, "Cash", "Completed", 5.0, 120.0, Some(4.0))
            })
            .collect();
        let features = FeatureEngineer::engineer(&records);
        let config = EngineConfig::default();
        let specs = catalog::specs();
        let h1 = HypothesisEngine::run(&specs[0], &features, &config);

        assert!(matches!(h1.outcome, TestOutcome::InsufficientData { .. }));
    }

    #[test]
    fn premium_gap_is_detected() {
        let records: Vec<RawRecord> = (0..80)
            .map(|i| {
                let premium = i % 2 == 0;
                let vehicle = if premium { "AutoXL" } else { "Auto" };
                let value = if premium { 400.0 } else { 100.0 } + (i % 7) as f64;
                make_record(i, 9, vehicle, "Cash", "Completed", 8.0, value, Some(4.2))
            })
            .collect();
        let features = FeatureEngineer::engineer(&records);
        let config = EngineConfig::default();
        let specs = catalog::specs();
        let h1 = HypothesisEngine::run(&specs[0], &features, &config);

        match h1.outcome {
            TestOutcome::Computed {
                statistic,
                significant,
                ..
            } => {
                assert!(statistic > 0.0, "premium group mean should lead");
                assert!(significant);
            }
            TestOutcome::InsufficientData { reason } => panic!("unexpected: {reason}"),
        }
    }

    #[test]
    fn anova_drops_degenerate_groups() {
        // Two viable vehicle types plus one singleton: H9 still computes
        let mut records: Vec<RawRecord> = (0..40)
            .map(|i| {
                let vehicle = if i % 2 == 0 { "Auto" } else { "Bike" };
                let rating = if i % 2 == 0 { 4.0 } else { 4.5 } + (i % 3) as f64 * 0.1;
                make_record(i, 10, vehicle, "Cash", "Completed", 5.0, 100.0, Some(rating))
            })
            .collect();
        records.push(make_record(
            99,
            10,
            "Rickshaw",
            "Cash",
            "Completed",
            5.0,
            100.0,
            Some(3.0),
        ));
        let features = FeatureEngineer::engineer(&records);
        let config = EngineConfig::default();
        let specs = catalog::specs();
        let h9 = HypothesisEngine::run(&specs[8], &features, &config);

        assert!(
            matches!(h9.outcome, TestOutcome::Computed { .. }),
            "singleton group should be dropped, not void the test"
        );
    }

    #[test]
    fn missing_ratings_shrink_but_do_not_abort() {
        // Driver ratings absent on most rows: rating hypotheses degrade to
        // whatever pairs remain, revenue hypotheses are untouched.
        let records: Vec<RawRecord> = (0..50)
            .map(|i| {
                let rating = if i < 4 { Some(4.0 + (i % 3) as f64 * 0.2) } else { None };
                make_record(i, 9, "Go Mini", "Cash", "Completed", 5.0, 100.0 + i as f64, rating)
            })
            .collect();
        let features = FeatureEngineer::engineer(&records);
        let config = EngineConfig::default();
        let results = HypothesisEngine::run_catalog(&features, &config);
        assert_eq!(results.len(), 10);
    }
}
