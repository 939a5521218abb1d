//! Deterministic train/test partitioning.
//!
//! A seeded Fisher-Yates shuffle drives both variants, so the same seed and
//! row count always produce the same partition. The stratified variant
//! preserves class proportions in both partitions, which matters for the
//! heavily skewed rating target.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split row indices into (train, test) with the given held-out fraction.
///
/// Both partitions are non-empty for any n >= 2. Returned indices are sorted
/// ascending so downstream iteration order is reproducible.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_count = test_count_for(n, test_fraction);
    let (test, train) = indices.split_at(test_count);

    let mut train = train.to_vec();
    let mut test = test.to_vec();
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Stratified split: shuffle within each class, hold out the per-class share.
///
/// `labels[i]` is the class index of row i. Singleton classes stay entirely
/// in the training partition.
pub fn stratified_split(
    labels: &[usize],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let n_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (idx, &label) in labels.iter().enumerate() {
        by_class[label].push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class_indices in &mut by_class {
        if class_indices.is_empty() {
            continue;
        }
        class_indices.shuffle(&mut rng);
        let take = if class_indices.len() < 2 {
            0
        } else {
            test_count_for(class_indices.len(), test_fraction)
        };
        test.extend_from_slice(&class_indices[..take]);
        train.extend_from_slice(&class_indices[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Held-out count: rounded share, clamped so both partitions stay non-empty.
fn test_count_for(n: usize, test_fraction: f64) -> usize {
    let raw = (n as f64 * test_fraction).round() as usize;
    raw.clamp(1, n.saturating_sub(1).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_deterministic_for_fixed_seed() {
        let (train_a, test_a) = train_test_split(100, 0.2, 42);
        let (train_b, test_b) = train_test_split(100, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 80);
        assert_eq!(test_a.len(), 20);
    }

    #[test]
    fn different_seeds_differ() {
        let (_, test_a) = train_test_split(100, 0.2, 42);
        let (_, test_b) = train_test_split(100, 0.2, 43);
        assert_ne!(test_a, test_b);
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let (train, test) = train_test_split(57, 0.2, 7);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..57).collect::<Vec<_>>());
    }

    #[test]
    fn stratified_preserves_class_shares() {
        // 80 of class 0, 20 of class 1
        let labels: Vec<usize> = (0..100).map(|i| usize::from(i >= 80)).collect();
        let (train, test) = stratified_split(&labels, 0.2, 42);

        assert_eq!(train.len() + test.len(), 100);
        let test_class1 = test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(test_class1, 4, "20% of the 20 class-1 rows");
        let test_class0 = test.len() - test_class1;
        assert_eq!(test_class0, 16, "20% of the 80 class-0 rows");
    }

    #[test]
    fn singleton_class_stays_in_training() {
        let labels = vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let (train, test) = stratified_split(&labels, 0.2, 42);
        assert!(train.contains(&9));
        assert!(!test.contains(&9));
    }
}
