//! Evaluation metric calculations for both tasks.

use crate::types::{ClassReport, RatingCategory};

/// Coefficient of determination. Zero when the target has no variance.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Root-mean-squared error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mse: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

/// Mean absolute error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Fraction of exact class matches.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    correct as f64 / y_true.len() as f64
}

/// Per-class precision/recall/F1/support over the rating categories.
///
/// Classes absent from the partition still appear with zero support so the
/// skew toward High is visible rather than silently dropped.
pub fn per_class_report(y_true: &[usize], y_pred: &[usize]) -> Vec<ClassReport> {
    RatingCategory::ALL
        .iter()
        .enumerate()
        .map(|(class_idx, &class)| {
            let tp = y_true
                .iter()
                .zip(y_pred)
                .filter(|(&t, &p)| t == class_idx && p == class_idx)
                .count() as f64;
            let fp = y_true
                .iter()
                .zip(y_pred)
                .filter(|(&t, &p)| t != class_idx && p == class_idx)
                .count() as f64;
            let fn_ = y_true
                .iter()
                .zip(y_pred)
                .filter(|(&t, &p)| t == class_idx && p != class_idx)
                .count() as f64;
            let support = y_true.iter().filter(|&&t| t == class_idx).count();

            let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassReport {
                class,
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect()
}
