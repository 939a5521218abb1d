//! Typed column addressing over `RawRecord` rows.
//!
//! The quality module works per column (missingness ratios, imputation,
//! outlier capping). These enums enumerate the data-dictionary columns with
//! typed accessors so that per-column logic stays column-name-addressable
//! without stringly-typed field lookups.

use serde::{Deserialize, Serialize};

use super::record::RawRecord;

/// Numeric columns of the booking table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    RideDistance,
    BookingValue,
    DriverRatings,
    CustomerRating,
    AvgVtat,
    AvgCtat,
}

impl NumericColumn {
    pub const ALL: [Self; 6] = [
        Self::RideDistance,
        Self::BookingValue,
        Self::DriverRatings,
        Self::CustomerRating,
        Self::AvgVtat,
        Self::AvgCtat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RideDistance => "ride_distance",
            Self::BookingValue => "booking_value",
            Self::DriverRatings => "driver_ratings",
            Self::CustomerRating => "customer_rating",
            Self::AvgVtat => "avg_vtat",
            Self::AvgCtat => "avg_ctat",
        }
    }

    pub fn get(self, record: &RawRecord) -> Option<f64> {
        match self {
            Self::RideDistance => record.ride_distance,
            Self::BookingValue => record.booking_value,
            Self::DriverRatings => record.driver_ratings,
            Self::CustomerRating => record.customer_rating,
            Self::AvgVtat => record.avg_vtat,
            Self::AvgCtat => record.avg_ctat,
        }
    }

    pub fn set(self, record: &mut RawRecord, value: f64) {
        match self {
            Self::RideDistance => record.ride_distance = Some(value),
            Self::BookingValue => record.booking_value = Some(value),
            Self::DriverRatings => record.driver_ratings = Some(value),
            Self::CustomerRating => record.customer_rating = Some(value),
            Self::AvgVtat => record.avg_vtat = Some(value),
            Self::AvgCtat => record.avg_ctat = Some(value),
        }
    }
}

/// Categorical (text) columns of the booking table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalColumn {
    VehicleType,
    PaymentMethod,
    BookingStatus,
    PickupLocation,
    DropLocation,
}

impl CategoricalColumn {
    pub const ALL: [Self; 5] = [
        Self::VehicleType,
        Self::PaymentMethod,
        Self::BookingStatus,
        Self::PickupLocation,
        Self::DropLocation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::VehicleType => "vehicle_type",
            Self::PaymentMethod => "payment_method",
            Self::BookingStatus => "booking_status",
            Self::PickupLocation => "pickup_location",
            Self::DropLocation => "drop_location",
        }
    }

    pub fn get(self, record: &RawRecord) -> Option<&str> {
        match self {
            Self::VehicleType => record.vehicle_type.as_deref(),
            Self::PaymentMethod => record.payment_method.as_deref(),
            Self::BookingStatus => record.booking_status.as_deref(),
            Self::PickupLocation => record.pickup_location.as_deref(),
            Self::DropLocation => record.drop_location.as_deref(),
        }
    }

    pub fn set(self, record: &mut RawRecord, value: String) {
        match self {
            Self::VehicleType => record.vehicle_type = Some(value),
            Self::PaymentMethod => record.payment_method = Some(value),
            Self::BookingStatus => record.booking_status = Some(value),
            Self::PickupLocation => record.pickup_location = Some(value),
            Self::DropLocation => record.drop_location = Some(value),
        }
    }
}

/// Columns that downstream feature engineering cannot do without.
///
/// A required column that is entirely absent from the loaded table is a
/// schema-level failure, not a missingness problem.
pub const REQUIRED_NUMERIC: [NumericColumn; 4] = [
    NumericColumn::RideDistance,
    NumericColumn::BookingValue,
    NumericColumn::AvgVtat,
    NumericColumn::AvgCtat,
];

pub const REQUIRED_CATEGORICAL: [CategoricalColumn; 3] = [
    CategoricalColumn::VehicleType,
    CategoricalColumn::PaymentMethod,
    CategoricalColumn::BookingStatus,
];
