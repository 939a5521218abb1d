//! Shared data structures for the ride analytics engine
//!
//! This module defines the core types for the batch analytics pipeline:
//! - `RawRecord` / `FeatureRecord` (loaded rows and engineered rows)
//! - Column addressing enums for per-column quality logic
//! - `QualityReport` (missingness, dispositions, outlier bounds)
//! - `HypothesisSpec` / `HypothesisResult` (the fixed H1-H10 catalog)
//! - Model metrics, feature importances, predictions
//! - `Recommendation` (insight synthesizer output)

mod column;
mod hypothesis;
mod insight;
mod ml;
// Public because it contains the `quality_thresholds` sub-module
// which must remain accessible as `types::quality_thresholds`.
pub mod quality;
mod record;

pub use column::*;
pub use hypothesis::*;
pub use insight::*;
pub use ml::*;
pub use quality::*;
pub use record::*;
