//! RideIQ: Ride-Hailing Analytics & Predictive Modeling Engine
//!
//! One deterministic batch pass per dataset load: quality remediation,
//! feature engineering, a fixed hypothesis-testing catalog, two tree-ensemble
//! models and an insight synthesizer over their outputs.
//!
//! ## Architecture
//!
//! - **Loader**: CSV booking table into `RawRecord` rows
//! - **Quality Module**: missingness dispositions, imputation, IQR capping
//! - **Feature Engineering**: temporal/ratio/bin features per row
//! - **Hypothesis Engine**: H1-H10 catalog (t-test, ANOVA, correlation)
//! - **Model Pipeline**: revenue regression + rating classification forests
//! - **Insight Synthesizer**: ranked recommendation records
//!
//! Data flows loader -> quality -> features -> {hypotheses, models} ->
//! insights; the hypothesis catalog and the model trainings are independent
//! consumers of the same immutable feature table.

pub mod config;
pub mod features;
pub mod hypothesis;
pub mod insight;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod quality;
pub mod stats;
pub mod types;

// Re-export engine configuration
pub use config::EngineConfig;

// Re-export the stage entry points
pub use features::FeatureEngineer;
pub use hypothesis::HypothesisEngine;
pub use insight::InsightSynthesizer;
pub use loader::{DataLoader, SchemaError};
pub use model::{
    DataInsufficientError, EncodingError, ModelInput, ModelPipeline, Prediction, TrainedModel,
};
pub use pipeline::{AnalyticsBundle, AnalyticsPipeline};
pub use quality::QualityAssessor;

// Re-export commonly used types
pub use types::{
    FeatureRecord, HypothesisResult, QualityReport, RatingCategory, RawRecord, Recommendation,
    TestOutcome,
};
