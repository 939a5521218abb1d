//! Data Quality Module
//!
//! Validates the loaded booking table, quantifies missingness, imputes, and
//! caps outliers. Two-step contract:
//!
//! - `QualityAssessor::assess` produces a `QualityReport` (missingness ratios
//!   and dispositions, IQR outlier bounds, duplicate count, value ranges)
//!   without touching the input.
//! - `QualityAssessor::remediate` applies the report to a copy of the table:
//!   median imputation for numeric columns, mode imputation for categorical
//!   columns, and clamping of out-of-range values to the report's bounds.
//!
//! Capping (never row removal) is a deliberate policy: it trades
//! distributional fidelity for retained sample size and keeps reruns
//! reproducible. Columns above the missingness threshold are flagged for
//! review and excluded from automatic imputation; downstream consumers treat
//! them as optional.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::loader::SchemaError;
use crate::types::{
    CategoricalColumn, ColumnMissingness, Disposition, FillValue, NumericColumn, OutlierBounds,
    QualityReport, RawRecord, ValueRange, REQUIRED_CATEGORICAL, REQUIRED_NUMERIC,
};

/// Column name used for the timestamp in quality reporting.
const TIMESTAMP_COLUMN: &str = "booking_timestamp";

/// Data quality assessor for the booking table.
pub struct QualityAssessor;

impl QualityAssessor {
    /// Assess the raw table: missingness per column, dispositions, IQR
    /// outlier bounds, duplicate rows and value ranges.
    ///
    /// Fails with a `SchemaError` when a column required by downstream
    /// feature engineering has no observed values at all — that is a schema
    /// problem, not a missingness problem.
    pub fn assess(
        records: &[RawRecord],
        config: &EngineConfig,
    ) -> Result<QualityReport, SchemaError> {
        if records.is_empty() {
            return Err(SchemaError::EmptyTable);
        }

        Self::check_required_columns(records)?;

        let total_rows = records.len();
        let flag_threshold = config.quality.missing_flag_threshold;
        let mut missingness = Vec::new();

        // Timestamp column: reported like any other, imputed with the modal
        // timestamp below the threshold (earliest wins ties, so reruns are
        // bit-identical).
        let ts_missing = records.iter().filter(|r| r.timestamp.is_none()).count();
        if ts_missing > 0 {
            let ratio = ts_missing as f64 / total_rows as f64;
            let (disposition, fill) = if ratio > flag_threshold {
                (Disposition::FlagForReview, None)
            } else {
                let modal = modal_timestamp(records);
                (
                    Disposition::ImputeMode,
                    modal.map(|ts| FillValue::Label(ts.format("%Y-%m-%d %H:%M:%S").to_string())),
                )
            };
            missingness.push(ColumnMissingness {
                column: TIMESTAMP_COLUMN.to_string(),
                missing_count: ts_missing,
                missing_ratio: ratio,
                disposition,
                fill,
            });
        }

        for column in NumericColumn::ALL {
            let missing = records.iter().filter(|r| column.get(r).is_none()).count();
            if missing == 0 {
                continue;
            }
            let ratio = missing as f64 / total_rows as f64;
            let (disposition, fill) = if missing == total_rows {
                (Disposition::Drop, None)
            } else if ratio > flag_threshold {
                (Disposition::FlagForReview, None)
            } else {
                let observed = observed_values(records, column);
                (
                    Disposition::ImputeMedian,
                    Some(FillValue::Number(median(&observed))),
                )
            };
            missingness.push(ColumnMissingness {
                column: column.name().to_string(),
                missing_count: missing,
                missing_ratio: ratio,
                disposition,
                fill,
            });
        }

        for column in CategoricalColumn::ALL {
            let missing = records.iter().filter(|r| column.get(r).is_none()).count();
            if missing == 0 {
                continue;
            }
            let ratio = missing as f64 / total_rows as f64;
            let (disposition, fill) = if missing == total_rows {
                (Disposition::Drop, None)
            } else if ratio > flag_threshold {
                (Disposition::FlagForReview, None)
            } else {
                let modal = mode(records.iter().filter_map(|r| column.get(r)));
                (Disposition::ImputeMode, modal.map(FillValue::Label))
            };
            missingness.push(ColumnMissingness {
                column: column.name().to_string(),
                missing_count: missing,
                missing_ratio: ratio,
                disposition,
                fill,
            });
        }

        let multiplier = config.quality.iqr_multiplier;
        let mut outlier_bounds = Vec::new();
        let mut value_ranges = Vec::new();

        for column in NumericColumn::ALL {
            let mut observed = observed_values(records, column);
            if observed.is_empty() {
                continue;
            }
            observed.sort_by(|a, b| a.total_cmp(b));

            let q1 = quantile_sorted(&observed, 0.25);
            let q3 = quantile_sorted(&observed, 0.75);
            let iqr = q3 - q1;
            let lower = q1 - multiplier * iqr;
            let upper = q3 + multiplier * iqr;
            let outlier_count = observed.iter().filter(|&&v| v < lower || v > upper).count();

            outlier_bounds.push(OutlierBounds {
                column: column.name().to_string(),
                q1,
                q3,
                lower,
                upper,
                outlier_count,
            });

            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
            value_ranges.push(ValueRange {
                column: column.name().to_string(),
                min: observed[0],
                max: observed[observed.len() - 1],
                mean,
                median: median_sorted(&observed),
                std: sample_std(&observed, mean),
            });
        }

        let duplicate_rows = count_duplicates(records);
        if duplicate_rows > 0 {
            warn!(duplicate_rows, "duplicate rows detected in booking table");
        }

        debug!(
            rows = total_rows,
            columns_with_missing = missingness.len(),
            "quality assessment complete"
        );

        Ok(QualityReport {
            total_rows,
            duplicate_rows,
            missingness,
            outlier_bounds,
            value_ranges,
        })
    }

    /// Apply a quality report to the raw table, producing the cleaned copy.
    ///
    /// Imputes columns the report marked for imputation, then clamps numeric
    /// values to the report's outlier bounds. The input is never mutated and
    /// the row count never changes.
    pub fn remediate(records: &[RawRecord], report: &QualityReport) -> Vec<RawRecord> {
        let mut cleaned: Vec<RawRecord> = records.to_vec();

        for entry in &report.missingness {
            match (&entry.disposition, &entry.fill) {
                (Disposition::ImputeMedian, Some(FillValue::Number(fill))) => {
                    if let Some(column) = numeric_column_by_name(&entry.column) {
                        for record in &mut cleaned {
                            if column.get(record).is_none() {
                                column.set(record, *fill);
                            }
                        }
                    }
                }
                (Disposition::ImputeMode, Some(FillValue::Label(fill))) => {
                    if entry.column == TIMESTAMP_COLUMN {
                        if let Ok(ts) =
                            NaiveDateTime::parse_from_str(fill, "%Y-%m-%d %H:%M:%S")
                        {
                            for record in &mut cleaned {
                                if record.timestamp.is_none() {
                                    record.timestamp = Some(ts);
                                }
                            }
                        }
                    } else if let Some(column) = categorical_column_by_name(&entry.column) {
                        for record in &mut cleaned {
                            if column.get(record).is_none() {
                                column.set(record, fill.clone());
                            }
                        }
                    }
                }
                // Flagged and dropped columns are left untouched.
                _ => {}
            }
        }

        for bounds in &report.outlier_bounds {
            let Some(column) = numeric_column_by_name(&bounds.column) else {
                continue;
            };
            for record in &mut cleaned {
                if let Some(value) = column.get(record) {
                    column.set(record, value.clamp(bounds.lower, bounds.upper));
                }
            }
        }

        cleaned
    }

    fn check_required_columns(records: &[RawRecord]) -> Result<(), SchemaError> {
        if records.iter().all(|r| r.timestamp.is_none()) {
            return Err(SchemaError::EmptyColumn(TIMESTAMP_COLUMN));
        }
        for column in REQUIRED_NUMERIC {
            if records.iter().all(|r| column.get(r).is_none()) {
                return Err(SchemaError::EmptyColumn(column.name()));
            }
        }
        for column in REQUIRED_CATEGORICAL {
            if records.iter().all(|r| column.get(r).is_none()) {
                return Err(SchemaError::EmptyColumn(column.name()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Column lookups
// ============================================================================

fn numeric_column_by_name(name: &str) -> Option<NumericColumn> {
    NumericColumn::ALL.into_iter().find(|c| c.name() == name)
}

fn categorical_column_by_name(name: &str) -> Option<CategoricalColumn> {
    CategoricalColumn::ALL.into_iter().find(|c| c.name() == name)
}

fn observed_values(records: &[RawRecord], column: NumericColumn) -> Vec<f64> {
    records.iter().filter_map(|r| column.get(r)).collect()
}

// ============================================================================
// Descriptive statistics
// ============================================================================

/// Median of an unsorted sample.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    median_sorted(&sorted)
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Linear-interpolation quantile over a sorted sample.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx + 1 < n {
        sorted[idx] + frac * (sorted[idx + 1] - sorted[idx])
    } else {
        sorted[idx]
    }
}

/// Sample standard deviation (ddof = 1); 0.0 for a single observation.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Most frequent value; ties broken by lexicographically smallest so the
/// fill is stable across runs.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then(b_val.cmp(a_val))
        })
        .map(|(v, _)| v.to_string())
}

/// Most frequent timestamp; ties broken by earliest.
fn modal_timestamp(records: &[RawRecord]) -> Option<NaiveDateTime> {
    let mut counts: HashMap<NaiveDateTime, usize> = HashMap::new();
    for ts in records.iter().filter_map(|r| r.timestamp) {
        *counts.entry(ts).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_ts, a_count), (b_ts, b_count)| a_count.cmp(b_count).then(b_ts.cmp(a_ts)))
        .map(|(ts, _)| ts)
}

/// Count rows identical to an earlier row.
fn count_duplicates(records: &[RawRecord]) -> usize {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut duplicates = 0;
    for record in records {
        // Debug formatting is a stable full-row key for exact duplicates.
        if !seen.insert(format!("{record:?}")) {
            duplicates += 1;
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn make_record(id: &str, value: Option<f64>) -> RawRecord {
        RawRecord {
            booking_id: id.to_string(),
            timestamp: Some(ts(1, 9)),
            booking_status: Some("Completed".to_string()),
            vehicle_type: Some("Sedan".to_string()),
            payment_method: Some("UPI".to_string()),
            pickup_location: Some("Downtown".to_string()),
            drop_location: Some("Airport".to_string()),
            ride_distance: Some(10.0),
            booking_value: value,
            driver_ratings: Some(4.5),
            customer_rating: Some(4.4),
            avg_vtat: Some(7.0),
            avg_ctat: Some(30.0),
        }
    }

    fn make_table(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| make_record(&format!("B-{i}"), Some(100.0 + i as f64)))
            .collect()
    }

    #[test]
    fn assess_then_remediate_is_idempotent() {
        let config = EngineConfig::default();
        let mut records = make_table(20);
        records[3].booking_value = None;
        records[7].payment_method = None;

        let report_a = QualityAssessor::assess(&records, &config).unwrap();
        let report_b = QualityAssessor::assess(&records, &config).unwrap();
        assert_eq!(report_a, report_b);

        let clean_a = QualityAssessor::remediate(&records, &report_a);
        let clean_b = QualityAssessor::remediate(&records, &report_b);
        assert_eq!(clean_a, clean_b);
    }

    #[test]
    fn input_is_never_mutated() {
        let config = EngineConfig::default();
        let mut records = make_table(10);
        records[2].booking_value = None;
        let snapshot = records.clone();

        let report = QualityAssessor::assess(&records, &config).unwrap();
        let _clean = QualityAssessor::remediate(&records, &report);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn small_sample_capping_stays_within_bounds() {
        // Three observed values [1, 2, 1000]: interpolated quartiles give a
        // wide upper bound; nothing may exceed it after remediation.
        let config = EngineConfig::default();
        let mut records = make_table(3);
        records[0].booking_value = Some(1.0);
        records[1].booking_value = Some(2.0);
        records[2].booking_value = Some(1000.0);

        let report = QualityAssessor::assess(&records, &config).unwrap();
        let bounds = report.bounds_for("booking_value").unwrap();
        let clean = QualityAssessor::remediate(&records, &report);

        assert_eq!(clean.len(), records.len());
        for record in &clean {
            let v = record.booking_value.unwrap();
            assert!(v >= bounds.lower && v <= bounds.upper);
        }
    }

    #[test]
    fn extreme_outlier_is_capped_not_dropped() {
        let config = EngineConfig::default();
        let mut records = make_table(20);
        for (i, record) in records.iter_mut().enumerate() {
            record.booking_value = Some(100.0 + i as f64);
        }
        records[19].booking_value = Some(10_000.0);

        let report = QualityAssessor::assess(&records, &config).unwrap();
        let bounds = report.bounds_for("booking_value").unwrap();
        assert_eq!(bounds.outlier_count, 1);

        let clean = QualityAssessor::remediate(&records, &report);
        assert_eq!(clean.len(), 20);
        let capped = clean[19].booking_value.unwrap();
        assert!((capped - bounds.upper).abs() < 1e-9);
    }

    #[test]
    fn forty_percent_missing_is_flagged_not_imputed() {
        let config = EngineConfig::default();
        let mut records = make_table(10);
        for record in records.iter_mut().take(4) {
            record.customer_rating = None;
        }

        let report = QualityAssessor::assess(&records, &config).unwrap();
        let entry = report.missingness_for("customer_rating").unwrap();
        assert_eq!(entry.disposition, Disposition::FlagForReview);
        assert!(entry.fill.is_none());
        assert!((entry.missing_ratio - 0.4).abs() < 1e-9);
        assert_eq!(report.flagged_columns(), vec!["customer_rating"]);

        // Flagged column stays missing after remediation
        let clean = QualityAssessor::remediate(&records, &report);
        assert_eq!(clean.iter().filter(|r| r.customer_rating.is_none()).count(), 4);
    }

    #[test]
    fn below_threshold_numeric_gets_median() {
        let config = EngineConfig::default();
        let mut records = make_table(10);
        records[0].booking_value = None;

        let report = QualityAssessor::assess(&records, &config).unwrap();
        let entry = report.missingness_for("booking_value").unwrap();
        assert_eq!(entry.disposition, Disposition::ImputeMedian);

        let clean = QualityAssessor::remediate(&records, &report);
        assert!(clean[0].booking_value.is_some());
    }

    #[test]
    fn categorical_mode_tie_breaks_lexicographically() {
        let values = ["UPI", "Cash", "UPI", "Cash"];
        assert_eq!(mode(values.into_iter()), Some("Cash".to_string()));
    }

    #[test]
    fn entirely_missing_required_column_is_schema_error() {
        let config = EngineConfig::default();
        let mut records = make_table(5);
        for record in &mut records {
            record.booking_value = None;
        }
        let err = QualityAssessor::assess(&records, &config).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyColumn("booking_value")));
    }

    #[test]
    fn duplicate_rows_are_counted() {
        let config = EngineConfig::default();
        let mut records = make_table(5);
        records.push(records[0].clone());
        let report = QualityAssessor::assess(&records, &config).unwrap();
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn interpolated_quartiles_match_reference() {
        // [1, 2, 1000]: Q1 = 1.5, Q3 = 501 under linear interpolation
        let sorted = [1.0, 2.0, 1000.0];
        assert!((quantile_sorted(&sorted, 0.25) - 1.5).abs() < 1e-9);
        assert!((quantile_sorted(&sorted, 0.75) - 501.0).abs() < 1e-9);
    }
}
