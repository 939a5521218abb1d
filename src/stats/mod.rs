//! Statistical test primitives
//!
//! The inferential building blocks behind the hypothesis catalog, all with
//! p-values from the statrs distributions:
//! - `ttest`: independent two-sample t-test (pooled variance, Student's t)
//! - `anova`: one-way comparison of means (F distribution)
//! - `correlation`: Pearson coefficient with a Student's-t significance test
//!
//! Each primitive returns `None` instead of a result when the sample is too
//! small to compute, so callers can map that to an explicit
//! insufficient-data outcome rather than a panic or a bogus p-value.

pub mod anova;
pub mod correlation;
pub mod ttest;

pub use anova::{one_way_anova, AnovaTest};
pub use correlation::{correlation_test, pearson, CorrelationTest};
pub use ttest::{two_sample_ttest, TwoSampleTest};

/// Sample mean; 0.0 on an empty slice (callers gate on length first).
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with ddof = 1.
pub(crate) fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}
