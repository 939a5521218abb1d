//! One-way analysis of variance across k groups.
//!
//! F = (SS_between / (k-1)) / (SS_within / (N-k)), p-value from the
//! Fisher-Snedecor distribution. Eta-squared (SS_between / SS_total) is the
//! reported effect size.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use super::mean;

/// Result of a one-way comparison of means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaTest {
    /// F statistic.
    pub statistic: f64,
    pub p_value: f64,
    /// Between-group share of total variance, in [0, 1].
    pub eta_squared: f64,
    /// Number of groups compared.
    pub groups: usize,
    /// Total observations across groups.
    pub n: usize,
}

/// Run the test over k groups.
///
/// Returns `None` when fewer than 2 groups are supplied or any group has
/// fewer than 2 observations — callers pre-filter degenerate groups and map
/// `None` to an insufficient-data outcome.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<AnovaTest> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.len() < 2) {
        return None;
    }

    let n: usize = groups.iter().map(Vec::len).sum();
    let grand_sum: f64 = groups.iter().flat_map(|g| g.iter()).sum();
    let grand_mean = grand_sum / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let group_mean = mean(group);
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    if df_within <= 0.0 {
        return None;
    }

    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    // All groups internally constant: identical means mean no effect at all
    if ms_within == 0.0 && ms_between == 0.0 {
        return Some(AnovaTest {
            statistic: 0.0,
            p_value: 1.0,
            eta_squared: 0.0,
            groups: k,
            n,
        });
    }

    let statistic = ms_between / ms_within;
    let ss_total = ss_between + ss_within;
    let eta_squared = if ss_total == 0.0 { 0.0 } else { ss_between / ss_total };

    let p_value = match FisherSnedecor::new(df_between, df_within) {
        Ok(f_dist) => 1.0 - f_dist.cdf(statistic),
        Err(_) => 1.0,
    };

    Some(AnovaTest {
        statistic,
        p_value,
        eta_squared,
        groups: k,
        n,
    })
}
