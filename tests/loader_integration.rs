//! Loader Integration Tests
//!
//! Round-trips a CSV fixture through the loader and the quality pass, checks
//! the schema failure mode against a real file, and verifies the report
//! types serialize cleanly for the consuming dashboard layer.

use std::io::Write;

use rideiq::config::EngineConfig;
use rideiq::loader::{DataLoader, SchemaError};
use rideiq::quality::QualityAssessor;
use rideiq::types::Disposition;

const HEADER: &str = "Booking ID,Date,Time,Booking Status,Vehicle Type,Pickup Location,Drop Location,Ride Distance,Booking Value,Driver Ratings,Customer Rating,Avg VTAT,Avg CTAT,Payment Method";

fn write_fixture(contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn fixture_rows(n: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..n {
        let status = if i % 7 == 0 {
            "Cancelled by Customer"
        } else {
            "Completed"
        };
        // Every 9th row has a missing driver rating
        let rating = if i % 9 == 0 {
            String::new()
        } else {
            format!("{:.1}", 3.5 + (i % 15) as f64 * 0.1)
        };
        csv.push_str(&format!(
            "RID-{i:04},2024-03-{:02},{:02}:30:00,{status},Go Mini,\"Zone, Central\",Zone-2,{:.1},{:.1},{rating},4.2,{:.1},{:.1},UPI\n",
            1 + i % 28,
            i % 24,
            2.0 + (i % 18) as f64,
            40.0 + (i % 18) as f64 * 11.0,
            3.0 + (i % 10) as f64,
            15.0 + (i % 20) as f64,
        ));
    }
    csv
}

#[test]
fn csv_file_loads_and_assesses() -> anyhow::Result<()> {
    let file = write_fixture(&fixture_rows(120))?;
    let records = DataLoader::load_csv(file.path())?;
    assert_eq!(records.len(), 120);

    // Quoted pickup location kept its comma
    assert_eq!(records[0].pickup_location.as_deref(), Some("Zone, Central"));

    let config = EngineConfig::default();
    let report = QualityAssessor::assess(&records, &config)?;
    assert_eq!(report.total_rows, 120);

    let entry = report
        .missingness_for("driver_ratings")
        .expect("driver_ratings has gaps");
    assert_eq!(entry.disposition, Disposition::ImputeMedian);

    let clean = QualityAssessor::remediate(&records, &report);
    assert_eq!(clean.len(), 120);
    assert!(clean.iter().all(|r| r.driver_ratings.is_some()));
    Ok(())
}

#[test]
fn file_without_required_column_fails_loudly() -> anyhow::Result<()> {
    // No Booking Value column anywhere in the header
    let csv = "Booking ID,Date,Time,Booking Status,Vehicle Type,Ride Distance,Avg VTAT,Avg CTAT,Payment Method\n\
               RID-1,2024-03-01,09:00:00,Completed,Auto,5.0,4.0,20.0,Cash\n";
    let file = write_fixture(csv)?;

    match DataLoader::load_csv(file.path()) {
        Err(SchemaError::MissingColumn(column)) => assert_eq!(column, "booking_value"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_file_reports_the_path() {
    let err = DataLoader::load_csv(std::path::Path::new("/nonexistent/rides.csv")).unwrap_err();
    match err {
        SchemaError::Io(path, _) => assert!(path.to_string_lossy().contains("rides.csv")),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn reports_serialize_for_the_dashboard_layer() -> anyhow::Result<()> {
    let file = write_fixture(&fixture_rows(60))?;
    let records = DataLoader::load_csv(file.path())?;
    let config = EngineConfig::default();
    let report = QualityAssessor::assess(&records, &config)?;

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["total_rows"], 60);
    assert!(json["outlier_bounds"].is_array());
    assert!(json["missingness"].is_array());

    // Round-trip keeps the report intact
    let back: rideiq::QualityReport = serde_json::from_value(json)?;
    assert_eq!(back, report);
    Ok(())
}
