//! CART decision tree for the forest ensembles.
//!
//! Binary splits on numeric features, greedy impurity minimization:
//! variance for regression, Gini for classification. Nodes live in a flat
//! arena; leaves store a distribution — `[mean]` for regression, per-class
//! probabilities for classification — so the forest can average either kind
//! the same way.
//!
//! Split search is exact: per candidate feature the node samples are sorted
//! once and every boundary between distinct values is scanned with running
//! sums. Feature candidates are all features (regression) or a random subset
//! drawn from the tree's rng (classification), matching the conventional
//! ensemble defaults.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Prediction task, fixed per tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeTask {
    Regression,
    Classification { n_classes: usize },
}

/// Tree-growth parameters.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Candidate features per split; `None` means all features.
    pub max_features: Option<usize>,
}

/// Splits below this impurity decrease are noise, not structure.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree plus its raw (unnormalized) impurity-decrease totals.
#[derive(Debug, Clone)]
pub struct FittedTree {
    pub tree: DecisionTree,
    /// Per-feature impurity decrease, weighted by node share.
    pub importance: Vec<f64>,
}

/// One CART tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over the sample rows given by `sample_indices`.
    ///
    /// For classification, `y` holds class indices as floats (0.0, 1.0, ...).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        sample_indices: &[usize],
        task: TreeTask,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> FittedTree {
        let n_features = x.first().map_or(0, Vec::len);
        let mut builder = TreeBuilder {
            x,
            y,
            task,
            params,
            rng,
            n_features,
            n_total: sample_indices.len(),
            nodes: Vec::new(),
            importance: vec![0.0; n_features],
        };
        builder.build(sample_indices.to_vec(), 0);

        FittedTree {
            tree: Self {
                nodes: builder.nodes,
            },
            importance: builder.importance,
        }
    }

    /// Leaf distribution for one feature row.
    pub fn predict_row(&self, row: &[f64]) -> &[f64] {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    task: TreeTask,
    params: &'a TreeParams,
    rng: &'a mut StdRng,
    n_features: usize,
    n_total: usize,
    nodes: Vec<Node>,
    importance: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    decrease: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl TreeBuilder<'_> {
    /// Grow the node for `indices`, returning its arena id.
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let impurity = self.impurity(&indices);

        let should_split = depth < self.params.max_depth
            && indices.len() >= self.params.min_samples_split
            && impurity > MIN_IMPURITY_DECREASE;

        if !should_split {
            return self.push_leaf(&indices);
        }

        let Some(split) = self.best_split(&indices, impurity) else {
            return self.push_leaf(&indices);
        };

        // Weighted decrease credited to the split feature
        self.importance[split.feature] +=
            indices.len() as f64 / self.n_total as f64 * split.decrease;

        let node_id = self.nodes.len();
        // Placeholder; replaced once both children exist
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let left = self.build(split.left, depth + 1);
        let right = self.build(split.right, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn push_leaf(&mut self, indices: &[usize]) -> usize {
        let distribution = match self.task {
            TreeTask::Regression => {
                let mean =
                    indices.iter().map(|&i| self.y[i]).sum::<f64>() / indices.len().max(1) as f64;
                vec![mean]
            }
            TreeTask::Classification { n_classes } => {
                let mut counts = vec![0.0; n_classes];
                for &i in indices {
                    counts[self.y[i] as usize] += 1.0;
                }
                let total: f64 = counts.iter().sum();
                if total > 0.0 {
                    for c in &mut counts {
                        *c /= total;
                    }
                }
                counts
            }
        };
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    /// Node impurity: population variance (regression) or Gini (classification).
    fn impurity(&self, indices: &[usize]) -> f64 {
        let n = indices.len();
        if n == 0 {
            return 0.0;
        }
        match self.task {
            TreeTask::Regression => {
                let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
                let sum_sq: f64 = indices.iter().map(|&i| self.y[i] * self.y[i]).sum();
                let mean = sum / n as f64;
                (sum_sq / n as f64 - mean * mean).max(0.0)
            }
            TreeTask::Classification { n_classes } => {
                let mut counts = vec![0usize; n_classes];
                for &i in indices {
                    counts[self.y[i] as usize] += 1;
                }
                let n = n as f64;
                1.0 - counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum::<f64>()
            }
        }
    }

    /// Candidate features for this node, sorted for deterministic ties.
    fn candidate_features(&mut self) -> Vec<usize> {
        match self.params.max_features {
            Some(k) if k < self.n_features => {
                let mut all: Vec<usize> = (0..self.n_features).collect();
                all.shuffle(self.rng);
                let mut chosen = all[..k].to_vec();
                chosen.sort_unstable();
                chosen
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn best_split(&mut self, indices: &[usize], parent_impurity: f64) -> Option<BestSplit> {
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, decrease)

        for feature in self.candidate_features() {
            let mut ordered: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (self.x[i][feature], self.y[i]))
                .collect();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut scan = SplitScan::new(self.task, &ordered);
            for i in 1..n {
                scan.advance(&ordered[i - 1]);
                // Only boundaries between distinct values are valid thresholds
                if ordered[i].0 <= ordered[i - 1].0 {
                    continue;
                }
                scan.refresh();
                let weighted = (i as f64 * scan.left_impurity
                    + (n - i) as f64 * scan.right_impurity)
                    / n as f64;
                let decrease = parent_impurity - weighted;
                let better = match best {
                    Some((_, _, best_decrease)) => decrease > best_decrease,
                    None => decrease > MIN_IMPURITY_DECREASE,
                };
                if better {
                    let threshold = (ordered[i - 1].0 + ordered[i].0) / 2.0;
                    best = Some((feature, threshold, decrease));
                }
            }
        }

        let (feature, threshold, decrease) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.x[i][feature] <= threshold);
        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some(BestSplit {
            feature,
            threshold,
            decrease,
            left,
            right,
        })
    }
}

/// Running impurity state while scanning split boundaries left to right.
struct SplitScan {
    task: TreeTask,
    left_sum: f64,
    left_sum_sq: f64,
    left_counts: Vec<usize>,
    left_n: usize,
    left_impurity: f64,
    right_impurity: f64,
    total_sum: f64,
    total_sum_sq: f64,
    total_counts: Vec<usize>,
    total_n: usize,
}

impl SplitScan {
    fn new(task: TreeTask, ordered: &[(f64, f64)]) -> Self {
        let n_classes = match task {
            TreeTask::Regression => 0,
            TreeTask::Classification { n_classes } => n_classes,
        };
        let mut total_counts = vec![0usize; n_classes];
        let mut total_sum = 0.0;
        let mut total_sum_sq = 0.0;
        for &(_, y) in ordered {
            total_sum += y;
            total_sum_sq += y * y;
            if n_classes > 0 {
                total_counts[y as usize] += 1;
            }
        }
        Self {
            task,
            left_sum: 0.0,
            left_sum_sq: 0.0,
            left_counts: vec![0; n_classes],
            left_n: 0,
            left_impurity: 0.0,
            right_impurity: 0.0,
            total_sum,
            total_sum_sq,
            total_counts,
            total_n: ordered.len(),
        }
    }

    /// Move one sample from the right side to the left side.
    fn advance(&mut self, sample: &(f64, f64)) {
        let y = sample.1;
        self.left_sum += y;
        self.left_sum_sq += y * y;
        if !self.left_counts.is_empty() {
            self.left_counts[y as usize] += 1;
        }
        self.left_n += 1;
    }

    /// Recompute both side impurities for the current boundary.
    fn refresh(&mut self) {
        let right_n = self.total_n - self.left_n;
        match self.task {
            TreeTask::Regression => {
                self.left_impurity = variance_from_sums(self.left_sum, self.left_sum_sq, self.left_n);
                self.right_impurity = variance_from_sums(
                    self.total_sum - self.left_sum,
                    self.total_sum_sq - self.left_sum_sq,
                    right_n,
                );
            }
            TreeTask::Classification { .. } => {
                self.left_impurity = gini_from_counts(&self.left_counts, self.left_n);
                let right_counts: Vec<usize> = self
                    .total_counts
                    .iter()
                    .zip(&self.left_counts)
                    .map(|(t, l)| t - l)
                    .collect();
                self.right_impurity = gini_from_counts(&right_counts, right_n);
            }
        }
    }
}

fn variance_from_sums(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    (sum_sq / n as f64 - mean * mean).max(0.0)
}

fn gini_from_counts(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}
