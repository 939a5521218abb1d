//! Data quality report types: missingness, dispositions, outlier bounds.

use serde::{Deserialize, Serialize};

/// Default thresholds for the quality pass (overridden by `rideiq.toml`).
pub mod quality_thresholds {
    /// Missingness ratio above which a column is flagged for review instead
    /// of being imputed automatically.
    pub const MISSING_FLAG_THRESHOLD: f64 = 0.30;
    /// IQR multiplier for outlier bounds (Q1 - k*IQR, Q3 + k*IQR).
    pub const IQR_MULTIPLIER: f64 = 1.5;
    /// P-value threshold for statistical significance.
    pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;
    /// Minimum observations per group for a computable comparison test.
    pub const MIN_GROUP_OBSERVATIONS: usize = 2;
    /// Minimum paired samples for a computable correlation.
    pub const MIN_CORRELATION_SAMPLES: usize = 3;
}

/// What the quality pass decided to do with a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Missing numeric values are filled with the column median.
    ImputeMedian,
    /// Missing categorical values are filled with the column mode.
    ImputeMode,
    /// Too much missing data for automatic imputation; downstream consumers
    /// must treat the column as optional.
    FlagForReview,
    /// Column is entirely missing and carries no information.
    Drop,
}

/// Fill value used when a column is imputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Number(f64),
    Label(String),
}

/// Missingness summary and disposition for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissingness {
    pub column: String,
    pub missing_count: usize,
    /// Missing count over total rows, in [0, 1].
    pub missing_ratio: f64,
    pub disposition: Disposition,
    /// Present only for imputed columns.
    pub fill: Option<FillValue>,
}

/// IQR outlier bounds for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
    /// Observed values outside [lower, upper] at assessment time.
    pub outlier_count: usize,
}

/// Observed value range for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Full data quality report for one loaded table.
///
/// Produced once per load by `QualityAssessor::assess` and read-only
/// afterward; `remediate` consumes it to build the cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub duplicate_rows: usize,
    /// Columns with at least one missing value, in data-dictionary order.
    pub missingness: Vec<ColumnMissingness>,
    /// Bounds for every numeric column with at least one observed value.
    pub outlier_bounds: Vec<OutlierBounds>,
    pub value_ranges: Vec<ValueRange>,
}

impl QualityReport {
    pub fn missingness_for(&self, column: &str) -> Option<&ColumnMissingness> {
        self.missingness.iter().find(|m| m.column == column)
    }

    pub fn bounds_for(&self, column: &str) -> Option<&OutlierBounds> {
        self.outlier_bounds.iter().find(|b| b.column == column)
    }

    /// Columns excluded from automatic imputation.
    pub fn flagged_columns(&self) -> Vec<&str> {
        self.missingness
            .iter()
            .filter(|m| m.disposition == Disposition::FlagForReview)
            .map(|m| m.column.as_str())
            .collect()
    }
}
