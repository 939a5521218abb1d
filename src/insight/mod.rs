//! Insight Synthesizer
//!
//! Maps already-computed artifacts — significant hypothesis results and top
//! feature importances — onto human-readable recommendation records for
//! direct listing. Pure presentation logic: no new computation, fully
//! deterministic, ranked output (strongest evidence first).

use crate::model::TrainedModel;
use crate::types::{
    HypothesisResult, Recommendation, RecommendationCategory, Strength, TestOutcome,
};

/// Importance entries surfaced per model.
const TOP_FEATURES: usize = 3;

/// Deterministic artifact-to-recommendation mapping.
pub struct InsightSynthesizer;

impl InsightSynthesizer {
    /// Build the ranked recommendation list.
    ///
    /// Significant hypotheses come first, ordered by ascending p-value
    /// (strongest evidence first, catalog order on ties), followed by the
    /// top feature-importance entries of each available model. A missing
    /// model simply contributes nothing — the rest of the bundle stands.
    pub fn synthesize(
        results: &[HypothesisResult],
        revenue_model: Option<&TrainedModel>,
        rating_model: Option<&TrainedModel>,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        let mut significant: Vec<&HypothesisResult> =
            results.iter().filter(|r| r.is_significant()).collect();
        significant.sort_by(|a, b| {
            let pa = a.p_value().unwrap_or(1.0);
            let pb = b.p_value().unwrap_or(1.0);
            pa.total_cmp(&pb)
        });

        for result in significant {
            if let Some(rec) = Self::from_hypothesis(result) {
                recommendations.push(rec);
            }
        }

        if let Some(model) = revenue_model {
            recommendations.extend(Self::from_importances(
                model,
                "revenue_model",
                RecommendationCategory::Revenue,
                "fare levels",
            ));
        }
        if let Some(model) = rating_model {
            recommendations.extend(Self::from_importances(
                model,
                "rating_model",
                RecommendationCategory::Rating,
                "driver ratings",
            ));
        }

        recommendations
    }

    fn from_hypothesis(result: &HypothesisResult) -> Option<Recommendation> {
        let TestOutcome::Computed {
            p_value, effect, ..
        } = &result.outcome
        else {
            return None;
        };

        let (category, title) = match result.id.as_str() {
            "H1" => (
                RecommendationCategory::Revenue,
                "Prioritize premium vehicle supply",
            ),
            "H2" => (RecommendationCategory::Revenue, "Staff up for peak windows"),
            "H3" => (
                RecommendationCategory::Revenue,
                "Longer trips remain the revenue core",
            ),
            "H4" => (
                RecommendationCategory::Revenue,
                "Payment mix shifts revenue",
            ),
            "H5" => (
                RecommendationCategory::Revenue,
                "Long pickups depress revenue",
            ),
            "H6" => (
                RecommendationCategory::Rating,
                "Cut pickup times to protect driver ratings",
            ),
            "H7" => (
                RecommendationCategory::Operational,
                "Cancellations drag driver ratings",
            ),
            "H8" => (
                RecommendationCategory::Rating,
                "Payment method colors the rating experience",
            ),
            "H9" => (
                RecommendationCategory::Rating,
                "Vehicle type colors the rating experience",
            ),
            "H10" => (
                RecommendationCategory::Rating,
                "Watch trip duration for customer satisfaction",
            ),
            _ => return None,
        };

        Some(Recommendation {
            category,
            title: title.to_string(),
            detail: format!(
                "{} ({} effect, p = {:.4}).",
                result.statement,
                strength_label(effect.strength),
                p_value
            ),
            source: result.id.clone(),
        })
    }

    fn from_importances(
        model: &TrainedModel,
        model_name: &str,
        category: RecommendationCategory,
        target_label: &str,
    ) -> Vec<Recommendation> {
        model
            .importances
            .iter()
            .take(TOP_FEATURES)
            .map(|fi| Recommendation {
                category,
                title: format!("{} is a top driver of {}", fi.feature, target_label),
                detail: format!(
                    "{} carries {:.1}% of the model's predictive weight for {}.",
                    fi.feature,
                    fi.importance * 100.0,
                    target_label
                ),
                source: format!("{}/{}", model_name, fi.feature),
            })
            .collect()
    }
}

fn strength_label(strength: Strength) -> &'static str {
    match strength {
        Strength::Weak => "weak",
        Strength::Moderate => "moderate",
        Strength::Strong => "strong",
    }
}
