//! Feature Engineering Pipeline
//!
//! Derives temporal, categorical and ratio features from quality-checked
//! records. The mapping is pure and per-row (no cross-row state) apart from
//! the fixed threshold constants: peak-morning hours [7, 10), peak-evening
//! hours [17, 20), distance bins at 5/10/20 km, rating bins at 2/3.5.
//!
//! Output ordering matches input ordering so downstream joins stay
//! reproducible. Ratio features guard division by zero: a zero or missing
//! denominator leaves the ratio absent rather than infinite.

use chrono::{Datelike, Timelike};

use crate::types::{
    DistanceCategory, FeatureRecord, RatingCategory, RawRecord, TimePeriod,
};

/// Peak-morning window: hour in [7, 10).
const PEAK_MORNING: std::ops::Range<u32> = 7..10;
/// Peak-evening window: hour in [17, 20).
const PEAK_EVENING: std::ops::Range<u32> = 17..20;

/// Stateless feature engineering pass.
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Engineer features for every record, preserving input order.
    pub fn engineer(records: &[RawRecord]) -> Vec<FeatureRecord> {
        records.iter().map(Self::engineer_one).collect()
    }

    /// Derive one feature row from one remediated record.
    pub fn engineer_one(record: &RawRecord) -> FeatureRecord {
        let hour = record.timestamp.map(|ts| ts.hour());
        // chrono Monday=0 via num_days_from_monday
        let day_of_week = record.timestamp.map(|ts| ts.weekday().num_days_from_monday());
        let month = record.timestamp.map(|ts| ts.month());

        let is_weekend = day_of_week.is_some_and(|d| d >= 5);
        let is_peak_morning = hour.is_some_and(|h| PEAK_MORNING.contains(&h));
        let is_peak_evening = hour.is_some_and(|h| PEAK_EVENING.contains(&h));
        let time_period = hour.map(TimePeriod::from_hour);

        let revenue_per_km = guarded_ratio(record.booking_value, record.ride_distance);
        let revenue_per_minute = guarded_ratio(record.booking_value, record.avg_ctat);

        let (is_completed, is_cancelled, cancelled_by_customer, cancelled_by_driver, is_incomplete) =
            status_flags(record.booking_status.as_deref());

        FeatureRecord {
            booking_id: record.booking_id.clone(),
            timestamp: record.timestamp,
            hour,
            day_of_week,
            month,
            is_weekend,
            is_peak_morning,
            is_peak_evening,
            time_period,
            vehicle_type: record.vehicle_type.clone(),
            payment_method: record.payment_method.clone(),
            pickup_location: record.pickup_location.clone(),
            drop_location: record.drop_location.clone(),
            ride_distance: record.ride_distance,
            booking_value: record.booking_value,
            driver_ratings: record.driver_ratings,
            customer_rating: record.customer_rating,
            avg_vtat: record.avg_vtat,
            avg_ctat: record.avg_ctat,
            revenue_per_km,
            revenue_per_minute,
            driver_rating_category: record.driver_ratings.and_then(RatingCategory::from_rating),
            customer_rating_category: record.customer_rating.and_then(RatingCategory::from_rating),
            distance_category: record.ride_distance.and_then(DistanceCategory::from_km),
            is_completed,
            is_cancelled,
            cancelled_by_customer,
            cancelled_by_driver,
            is_incomplete,
        }
    }
}

/// Numerator over denominator, absent when either is missing or the
/// denominator is zero.
fn guarded_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Classify a booking status into mutually exclusive flags.
///
/// Exactly one of completed/cancelled/incomplete is true. Statuses that are
/// neither completed nor cancelled (including "No Driver Found" and anything
/// unrecognized) classify as incomplete.
fn status_flags(status: Option<&str>) -> (bool, bool, bool, bool, bool) {
    let lower = status.map(str::to_lowercase).unwrap_or_default();

    let cancelled_by_customer = lower.contains("cancelled by customer");
    let cancelled_by_driver = lower.contains("cancelled by driver");
    let is_cancelled = lower.contains("cancelled");
    let is_completed = !is_cancelled && lower.contains("completed");
    let is_incomplete = !is_completed && !is_cancelled;

    (
        is_completed,
        is_cancelled,
        cancelled_by_customer,
        cancelled_by_driver,
        is_incomplete,
    )
}
