//! Recommendation records produced by the insight synthesizer.

use serde::{Deserialize, Serialize};

/// Business area a recommendation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Revenue,
    Rating,
    Operational,
}

/// One human-readable recommendation, derived deterministically from a
/// significant hypothesis result or a top feature importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub title: String,
    pub detail: String,
    /// Provenance: a hypothesis id ("H3") or a model feature
    /// ("revenue_model/ride_distance").
    pub source: String,
}
