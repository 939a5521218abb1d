//! Hypothesis testing types: specs, outcomes, effect sizes.

use serde::{Deserialize, Serialize};

/// Which statistical test a hypothesis maps to. Selection is fixed per
/// hypothesis, not learned from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    /// Two groups, continuous outcome: independent two-sample t-test.
    TwoSample,
    /// Three or more groups, continuous outcome: one-way ANOVA.
    MultiGroup,
    /// Two continuous variables: Pearson correlation with significance test.
    Correlation,
}

impl TestKind {
    pub fn test_name(self) -> &'static str {
        match self {
            Self::TwoSample => "Independent t-test",
            Self::MultiGroup => "One-way ANOVA",
            Self::Correlation => "Pearson correlation",
        }
    }
}

/// One hypothesis from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisSpec {
    /// Catalog identifier, "H1" through "H10".
    pub id: String,
    /// Natural-language statement of the hypothesis.
    pub statement: String,
    pub kind: TestKind,
    /// Grouping variable (comparison tests) or first continuous variable.
    pub group_variable: String,
    /// Continuous outcome variable (or second continuous variable).
    pub outcome_variable: String,
}

/// Qualitative strength bucket for an effect size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    /// Bucket a correlation coefficient: |r| < 0.3 weak, < 0.7 moderate,
    /// otherwise strong.
    pub fn from_abs_r(r: f64) -> Self {
        let r = r.abs();
        if r < 0.3 {
            Self::Weak
        } else if r < 0.7 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

    /// Bucket Cohen's d: |d| < 0.5 weak, < 0.8 moderate, otherwise strong.
    pub fn from_cohen_d(d: f64) -> Self {
        let d = d.abs();
        if d < 0.5 {
            Self::Weak
        } else if d < 0.8 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

    /// Bucket eta-squared: < 0.06 weak, < 0.14 moderate, otherwise strong.
    pub fn from_eta_squared(eta2: f64) -> Self {
        if eta2 < 0.06 {
            Self::Weak
        } else if eta2 < 0.14 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }
}

/// Which effect-size measure accompanies a test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectMeasure {
    /// Correlation coefficient (doubles as the test statistic for H3-style tests).
    PearsonR,
    /// Standardized mean difference for two-sample tests.
    CohensD,
    /// Between-group variance fraction for ANOVA.
    EtaSquared,
}

/// Effect size with its qualitative bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    pub measure: EffectMeasure,
    pub value: f64,
    pub strength: Strength,
}

/// Outcome of one hypothesis test.
///
/// A non-computable test (a group below the minimum observation count) is a
/// result, not an error: a batch run over the full catalog never aborts on
/// one bad group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestOutcome {
    Computed {
        statistic: f64,
        p_value: f64,
        /// p < 0.05, per test, with no multiple-comparison correction.
        significant: bool,
        effect: EffectSize,
    },
    InsufficientData {
        reason: String,
    },
}

/// Result of one hypothesis test, immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisResult {
    pub id: String,
    pub statement: String,
    pub test_name: String,
    pub group_variable: String,
    pub outcome_variable: String,
    pub outcome: TestOutcome,
}

impl HypothesisResult {
    pub fn is_significant(&self) -> bool {
        matches!(
            self.outcome,
            TestOutcome::Computed { significant: true, .. }
        )
    }

    pub fn p_value(&self) -> Option<f64> {
        match &self.outcome {
            TestOutcome::Computed { p_value, .. } => Some(*p_value),
            TestOutcome::InsufficientData { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_buckets_for_r() {
        assert_eq!(Strength::from_abs_r(0.1), Strength::Weak);
        assert_eq!(Strength::from_abs_r(-0.29), Strength::Weak);
        assert_eq!(Strength::from_abs_r(0.3), Strength::Moderate);
        assert_eq!(Strength::from_abs_r(-0.69), Strength::Moderate);
        assert_eq!(Strength::from_abs_r(0.7), Strength::Strong);
        assert_eq!(Strength::from_abs_r(-1.0), Strength::Strong);
    }

    #[test]
    fn insufficient_data_is_not_significant() {
        let result = HypothesisResult {
            id: "H1".to_string(),
            statement: "test".to_string(),
            test_name: TestKind::TwoSample.test_name().to_string(),
            group_variable: "g".to_string(),
            outcome_variable: "y".to_string(),
            outcome: TestOutcome::InsufficientData {
                reason: "group below minimum".to_string(),
            },
        };
        assert!(!result.is_significant());
        assert_eq!(result.p_value(), None);
    }
}
