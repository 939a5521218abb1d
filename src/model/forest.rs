//! Bootstrap-aggregated tree ensemble.
//!
//! Trees train in parallel across cores via rayon. Each tree draws its own
//! rng from `seed + tree index`, so tree construction is independent of
//! thread scheduling and a fixed seed always reproduces the same forest.
//! Feature importances are the per-tree normalized impurity decreases
//! averaged across trees; they sum to 1.0 for any forest that found at
//! least one split.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::tree::{DecisionTree, TreeParams, TreeTask};

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
    /// Candidate features per split; `None` means all.
    pub max_features: Option<usize>,
}

/// Trained ensemble over bootstrap resamples.
#[derive(Debug, Clone)]
pub struct RandomForest {
    task: TreeTask,
    trees: Vec<DecisionTree>,
    /// Normalized importances, one per feature.
    importances: Vec<f64>,
}

impl RandomForest {
    /// Train the ensemble on the full supplied rows.
    ///
    /// For classification, `y` holds class indices as floats.
    pub fn fit(x: &[Vec<f64>], y: &[f64], task: TreeTask, params: &ForestParams) -> Self {
        let n = x.len();
        let n_features = x.first().map_or(0, Vec::len);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: 2,
            max_features: params.max_features,
        };

        let fitted: Vec<_> = (0..params.n_estimators)
            .into_par_iter()
            .map(|t| {
                // Offset seed per tree keeps parallel training deterministic
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, &sample, task, &tree_params, &mut rng)
            })
            .collect();

        // Average the per-tree normalized importances
        let mut importances = vec![0.0; n_features];
        let mut contributing_trees = 0usize;
        for tree in &fitted {
            let total: f64 = tree.importance.iter().sum();
            if total <= 0.0 {
                continue;
            }
            contributing_trees += 1;
            for (acc, &raw) in importances.iter_mut().zip(&tree.importance) {
                *acc += raw / total;
            }
        }
        if contributing_trees > 0 {
            for v in &mut importances {
                *v /= contributing_trees as f64;
            }
        }

        Self {
            task,
            trees: fitted.into_iter().map(|f| f.tree).collect(),
            importances,
        }
    }

    /// Regression prediction: mean of tree means.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)[0]).sum();
        sum / self.trees.len() as f64
    }

    /// Classification prediction: per-class probabilities averaged over trees.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let n_classes = match self.task {
            TreeTask::Classification { n_classes } => n_classes,
            TreeTask::Regression => return vec![self.predict(row)],
        };
        let mut probabilities = vec![0.0; n_classes];
        for tree in &self.trees {
            for (acc, p) in probabilities.iter_mut().zip(tree.predict_row(row)) {
                *acc += p;
            }
        }
        for p in &mut probabilities {
            *p /= self.trees.len() as f64;
        }
        probabilities
    }

    /// Winning class index.
    pub fn predict_class(&self, row: &[f64]) -> usize {
        let probabilities = self.predict_proba(row);
        probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(idx, _)| idx)
    }

    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
