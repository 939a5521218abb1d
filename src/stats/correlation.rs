//! Pearson correlation with statistical significance testing.
//!
//! P-values come from the Student's t-distribution: t = r·sqrt(n-2) /
//! sqrt(1-r²) with n-2 degrees of freedom, two-tailed.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a correlation significance test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationTest {
    /// Pearson coefficient in [-1, 1].
    pub r: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Paired sample count.
    pub n: usize,
}

/// Pearson correlation coefficient.
///
/// Formula: r = Σ[(xi - x̄)(yi - ȳ)] / sqrt(Σ(xi - x̄)² × Σ(yi - ȳ)²)
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Pearson correlation with its two-tailed significance test.
///
/// Returns `None` when fewer than 3 pairs are available or the slices
/// disagree in length — the test is not computable, not merely weak.
pub fn correlation_test(x: &[f64], y: &[f64]) -> Option<CorrelationTest> {
    let n = x.len();
    if n < 3 || n != y.len() {
        return None;
    }

    let r = pearson(x, y);
    Some(CorrelationTest {
        r,
        p_value: p_value_for_r(r, n),
        n,
    })
}

/// Two-tailed p-value for a Pearson coefficient at sample size n.
fn p_value_for_r(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }

    // Perfect or near-perfect correlation is highly significant
    if r.abs() >= 0.9999 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}
