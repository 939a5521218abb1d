//! Ride record types: raw input rows and engineered feature rows.
//!
//! `RawRecord` is one row of the loaded booking table, immutable once loaded.
//! `FeatureRecord` is the engineered row derived from a remediated `RawRecord`;
//! it carries the temporal/ratio/bin features plus booking-status flags.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the raw booking table.
///
/// All measures and categorical dimensions are optional: the loader recovers
/// unparseable cells as missing rather than aborting the batch. Remediation
/// (median/mode imputation) fills most of them before feature engineering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub booking_id: String,
    pub timestamp: Option<NaiveDateTime>,
    pub booking_status: Option<String>,
    pub vehicle_type: Option<String>,
    pub payment_method: Option<String>,
    pub pickup_location: Option<String>,
    pub drop_location: Option<String>,
    /// Ride distance in km
    pub ride_distance: Option<f64>,
    /// Revenue for the booking
    pub booking_value: Option<f64>,
    pub driver_ratings: Option<f64>,
    pub customer_rating: Option<f64>,
    /// Vehicle time to arrival (minutes from booking to pickup)
    pub avg_vtat: Option<f64>,
    /// Customer time at trip (total trip duration in minutes)
    pub avg_ctat: Option<f64>,
}

/// Rating bucket for driver/customer ratings (bins at 2 and 3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RatingCategory {
    Low,
    Medium,
    High,
}

impl RatingCategory {
    /// Classify a rating on the 0-5 scale. Ratings outside [0, 5] are invalid.
    pub fn from_rating(rating: f64) -> Option<Self> {
        if !(0.0..=5.0).contains(&rating) {
            return None;
        }
        if rating <= 2.0 {
            Some(Self::Low)
        } else if rating <= 3.5 {
            Some(Self::Medium)
        } else {
            Some(Self::High)
        }
    }

    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];
}

/// Distance bucket (bins at 5, 10 and 20 km).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceCategory {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl DistanceCategory {
    /// Classify a ride distance in km. Negative distances are invalid.
    pub fn from_km(km: f64) -> Option<Self> {
        if km < 0.0 {
            return None;
        }
        if km <= 5.0 {
            Some(Self::Short)
        } else if km <= 10.0 {
            Some(Self::Medium)
        } else if km <= 20.0 {
            Some(Self::Long)
        } else {
            Some(Self::VeryLong)
        }
    }
}

/// Coarse time-of-day bucket derived from the booking hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimePeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=6 => Self::Night,
            7..=12 => Self::Morning,
            13..=18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }
}

/// Engineered feature row.
///
/// Invariant: exactly one of `is_completed`, `is_cancelled`, `is_incomplete`
/// is true. Unknown booking statuses (e.g. "No Driver Found") classify as
/// incomplete so the invariant is total over all inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub booking_id: String,
    pub timestamp: Option<NaiveDateTime>,

    // Temporal features (absent when the timestamp could not be parsed)
    pub hour: Option<u32>,
    /// Day of week, 0 = Monday .. 6 = Sunday
    pub day_of_week: Option<u32>,
    pub month: Option<u32>,
    pub is_weekend: bool,
    /// Booking hour in [7, 10)
    pub is_peak_morning: bool,
    /// Booking hour in [17, 20)
    pub is_peak_evening: bool,
    pub time_period: Option<TimePeriod>,

    // Measures carried through from the remediated record
    pub vehicle_type: Option<String>,
    pub payment_method: Option<String>,
    pub pickup_location: Option<String>,
    pub drop_location: Option<String>,
    pub ride_distance: Option<f64>,
    pub booking_value: Option<f64>,
    pub driver_ratings: Option<f64>,
    pub customer_rating: Option<f64>,
    pub avg_vtat: Option<f64>,
    pub avg_ctat: Option<f64>,

    // Ratio features (absent when the denominator is zero or missing)
    pub revenue_per_km: Option<f64>,
    pub revenue_per_minute: Option<f64>,

    // Categorical bins
    pub driver_rating_category: Option<RatingCategory>,
    pub customer_rating_category: Option<RatingCategory>,
    pub distance_category: Option<DistanceCategory>,

    // Booking-status flags
    pub is_completed: bool,
    pub is_cancelled: bool,
    pub cancelled_by_customer: bool,
    pub cancelled_by_driver: bool,
    pub is_incomplete: bool,
}

impl FeatureRecord {
    /// True when the booking is in a peak window (morning or evening).
    pub fn is_peak(&self) -> bool {
        self.is_peak_morning || self.is_peak_evening
    }
}
