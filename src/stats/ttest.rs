//! Independent two-sample t-test (pooled variance).
//!
//! Matches the classic equal-variance Student's t-test: the pooled standard
//! deviation feeds both the statistic and the Cohen's d effect size. The
//! p-value is two-sided, from the t-distribution with n_a + n_b - 2 degrees
//! of freedom.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{mean, sample_variance};

/// Result of an independent two-sample mean comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTest {
    /// t statistic (sign follows mean_a - mean_b).
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Standardized mean difference (pooled).
    pub cohen_d: f64,
    pub mean_a: f64,
    pub mean_b: f64,
    pub n_a: usize,
    pub n_b: usize,
}

/// Run the test. Returns `None` when either group has fewer than 2
/// observations — the comparison is not computable.
pub fn two_sample_ttest(a: &[f64], b: &[f64]) -> Option<TwoSampleTest> {
    let n_a = a.len();
    let n_b = b.len();
    if n_a < 2 || n_b < 2 {
        return None;
    }

    let mean_a = mean(a);
    let mean_b = mean(b);
    let var_a = sample_variance(a, mean_a);
    let var_b = sample_variance(b, mean_b);

    let df = (n_a + n_b - 2) as f64;
    let pooled_var = ((n_a - 1) as f64 * var_a + (n_b - 1) as f64 * var_b) / df;
    let pooled_sd = pooled_var.sqrt();

    // Both groups constant: identical means carry no evidence either way
    if pooled_sd == 0.0 && (mean_a - mean_b).abs() < f64::EPSILON {
        return Some(TwoSampleTest {
            statistic: 0.0,
            p_value: 1.0,
            cohen_d: 0.0,
            mean_a,
            mean_b,
            n_a,
            n_b,
        });
    }

    let se = pooled_sd * (1.0 / n_a as f64 + 1.0 / n_b as f64).sqrt();
    let statistic = (mean_a - mean_b) / se;
    let cohen_d = (mean_a - mean_b) / pooled_sd;

    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(statistic.abs())),
        Err(_) => 1.0,
    };

    Some(TwoSampleTest {
        statistic,
        p_value,
        cohen_d,
        mean_a,
        mean_b,
        n_a,
        n_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearly_separated_groups_are_significant() {
        let a: Vec<f64> = (0..50).map(|i| 100.0 + (i % 5) as f64).collect();
        let b: Vec<f64> = (0..50).map(|i| 50.0 + (i % 5) as f64).collect();

        let test = two_sample_ttest(&a, &b).unwrap();
        assert!(test.statistic > 0.0);
        assert!(test.p_value < 1e-6);
        assert!(test.cohen_d > 0.8, "expected a strong effect, got d={}", test.cohen_d);
    }

    #[test]
    fn identical_groups_are_not_significant() {
        let a: Vec<f64> = (0..30).map(|i| (i % 7) as f64).collect();
        let b = a.clone();

        let test = two_sample_ttest(&a, &b).unwrap();
        assert!(test.statistic.abs() < 1e-12);
        assert!(test.p_value > 0.99);
    }

    #[test]
    fn singleton_group_not_computable() {
        assert!(two_sample_ttest(&[1.0], &[2.0, 3.0, 4.0]).is_none());
        assert!(two_sample_ttest(&[2.0, 3.0], &[]).is_none());
    }

    #[test]
    fn constant_equal_groups_report_no_evidence() {
        let test = two_sample_ttest(&[5.0, 5.0, 5.0], &[5.0, 5.0]).unwrap();
        assert_eq!(test.statistic, 0.0);
        assert_eq!(test.p_value, 1.0);
    }

    #[test]
    fn sign_follows_first_group() {
        let test = two_sample_ttest(&[1.0, 2.0, 3.0], &[10.0, 11.0, 12.0]).unwrap();
        assert!(test.statistic < 0.0);
        assert!(test.cohen_d < 0.0);
    }
}
