//! Booking table loader
//!
//! Parses a CSV export of the booking table into `RawRecord` rows. The caller
//! may supply any tabular source; this module only requires column presence
//! matching the data dictionary (booking_id, a timestamp source, vehicle_type,
//! ride_distance, booking_value, booking_status, avg_vtat, avg_ctat,
//! payment_method, plus optional ratings and locations).
//!
//! ## Error policy
//!
//! - A required column missing from the header is a `SchemaError` — fatal,
//!   aborts the load.
//! - An unparseable cell (bad number, bad timestamp) makes that one field
//!   missing for that row. The quality pass imputes it later; a bad row never
//!   aborts the batch.
//!
//! Timestamps arrive either as a combined `booking_timestamp` column or as
//! separate `date` + `time` columns; both layouts are accepted.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::RawRecord;

/// Schema-level load failures. These are not recoverable: without the
/// required columns none of the downstream stages can run.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("input table has no header row")]
    EmptyTable,

    #[error("required column `{0}` missing from input schema")]
    MissingColumn(&'static str),

    #[error("required column `{0}` has no observed values")]
    EmptyColumn(&'static str),
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Returns owned strings because quoted fields need unquoting.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Check for escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.clone());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Normalize a header cell: trim, lowercase, spaces to underscores.
fn normalize_header(cell: &str) -> String {
    cell.trim().to_lowercase().replace(' ', "_")
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Maps normalized CSV column names to indices.
#[derive(Debug, Clone, Default)]
struct ColumnMap {
    booking_id: Option<usize>,
    // Either a combined timestamp or separate date + time columns
    booking_timestamp: Option<usize>,
    date: Option<usize>,
    time: Option<usize>,

    booking_status: Option<usize>,
    vehicle_type: Option<usize>,
    payment_method: Option<usize>,
    pickup_location: Option<usize>,
    drop_location: Option<usize>,

    ride_distance: Option<usize>,
    booking_value: Option<usize>,
    driver_ratings: Option<usize>,
    customer_rating: Option<usize>,
    avg_vtat: Option<usize>,
    avg_ctat: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &str) -> Self {
        let mut map = Self::default();
        for (idx, cell) in csv_split(header).iter().enumerate() {
            match normalize_header(cell).as_str() {
                "booking_id" => map.booking_id = Some(idx),
                "booking_timestamp" => map.booking_timestamp = Some(idx),
                "date" => map.date = Some(idx),
                "time" => map.time = Some(idx),
                "booking_status" => map.booking_status = Some(idx),
                "vehicle_type" => map.vehicle_type = Some(idx),
                "payment_method" => map.payment_method = Some(idx),
                "pickup_location" => map.pickup_location = Some(idx),
                "drop_location" => map.drop_location = Some(idx),
                "ride_distance" => map.ride_distance = Some(idx),
                "booking_value" => map.booking_value = Some(idx),
                "driver_ratings" => map.driver_ratings = Some(idx),
                "customer_rating" => map.customer_rating = Some(idx),
                "avg_vtat" => map.avg_vtat = Some(idx),
                "avg_ctat" => map.avg_ctat = Some(idx),
                _ => {}
            }
        }
        map
    }

    /// Check that every column feature engineering depends on is present.
    fn validate(&self) -> Result<(), SchemaError> {
        if self.booking_id.is_none() {
            return Err(SchemaError::MissingColumn("booking_id"));
        }
        if self.booking_timestamp.is_none() && (self.date.is_none() || self.time.is_none()) {
            return Err(SchemaError::MissingColumn("booking_timestamp"));
        }
        if self.booking_status.is_none() {
            return Err(SchemaError::MissingColumn("booking_status"));
        }
        if self.vehicle_type.is_none() {
            return Err(SchemaError::MissingColumn("vehicle_type"));
        }
        if self.payment_method.is_none() {
            return Err(SchemaError::MissingColumn("payment_method"));
        }
        if self.ride_distance.is_none() {
            return Err(SchemaError::MissingColumn("ride_distance"));
        }
        if self.booking_value.is_none() {
            return Err(SchemaError::MissingColumn("booking_value"));
        }
        if self.avg_vtat.is_none() {
            return Err(SchemaError::MissingColumn("avg_vtat"));
        }
        if self.avg_ctat.is_none() {
            return Err(SchemaError::MissingColumn("avg_ctat"));
        }
        Ok(())
    }
}

// ============================================================================
// Cell Parsing
// ============================================================================

/// Fetch a trimmed cell; empty and null-ish markers count as missing.
fn text_at(fields: &[String], idx: Option<usize>) -> Option<String> {
    let cell = fields.get(idx?)?.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("null") || cell.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Parse a numeric cell; anything unparseable is missing for that row.
fn number_at(fields: &[String], idx: Option<usize>) -> Option<f64> {
    let cell = text_at(fields, idx)?;
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepted timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn timestamp_at(fields: &[String], map: &ColumnMap) -> Option<NaiveDateTime> {
    if let Some(raw) = text_at(fields, map.booking_timestamp) {
        return parse_timestamp(&raw);
    }
    // Split layout: separate date and time columns
    let date = text_at(fields, map.date)?;
    let time = text_at(fields, map.time)?;
    parse_timestamp(&format!("{date} {time}"))
}

// ============================================================================
// Loader
// ============================================================================

/// Booking table loader.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file into raw records.
    pub fn load_csv(path: &Path) -> Result<Vec<RawRecord>, SchemaError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(path.to_path_buf(), e))?;
        Self::parse_csv(&contents)
    }

    /// Parse CSV contents into raw records.
    ///
    /// Row ordering is preserved: downstream stages rely on stable ordering
    /// for reproducible joins.
    pub fn parse_csv(contents: &str) -> Result<Vec<RawRecord>, SchemaError> {
        let mut lines = contents.lines();
        let header = loop {
            match lines.next() {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => break line,
                None => return Err(SchemaError::EmptyTable),
            }
        };

        let map = ColumnMap::from_header(header);
        map.validate()?;

        let mut records = Vec::new();
        let mut bad_timestamps = 0usize;

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields = csv_split(line);

            let timestamp = timestamp_at(&fields, &map);
            if timestamp.is_none() {
                bad_timestamps += 1;
            }

            records.push(RawRecord {
                booking_id: text_at(&fields, map.booking_id).unwrap_or_default(),
                timestamp,
                booking_status: text_at(&fields, map.booking_status),
                vehicle_type: text_at(&fields, map.vehicle_type),
                payment_method: text_at(&fields, map.payment_method),
                pickup_location: text_at(&fields, map.pickup_location),
                drop_location: text_at(&fields, map.drop_location),
                ride_distance: number_at(&fields, map.ride_distance),
                booking_value: number_at(&fields, map.booking_value),
                driver_ratings: number_at(&fields, map.driver_ratings),
                customer_rating: number_at(&fields, map.customer_rating),
                avg_vtat: number_at(&fields, map.avg_vtat),
                avg_ctat: number_at(&fields, map.avg_ctat),
            });
        }

        if bad_timestamps > 0 {
            warn!(
                rows = bad_timestamps,
                "rows with unparseable timestamps were kept with the field missing"
            );
        }
        debug!(rows = records.len(), "parsed booking table");

        Ok(records)
    }
}
