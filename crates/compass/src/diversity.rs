//! Submission diversity.
//!
//! Diversity is the mean pairwise dissimilarity of the registered models,
//! where two models are compared by the clusters their elements fall into:
//! `1 - |A ∩ B| / |A ∪ B|`. Above a configured number of pairs, a seeded
//! sample of pairs is compared instead, so the figure is reproducible.

use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng, seq::index};

use crate::{config::DiversityConfig, index::ClusterId};

/// Mean pairwise Jaccard distance of the given cluster sets.
///
/// Fewer than two models yield 0.0.
pub fn diversity(cluster_sets: &[HashSet<ClusterId>], config: &DiversityConfig) -> f64 {
    let n = cluster_sets.len();
    if n < 2 {
        return 0.0;
    }

    let total_pairs = n * (n - 1) / 2;
    let pairs: Vec<usize> = if total_pairs <= config.max_pairs() {
        (0..total_pairs).collect()
    } else {
        let mut rng = StdRng::seed_from_u64(config.seed());
        let mut sample = index::sample(&mut rng, total_pairs, config.max_pairs()).into_vec();
        sample.sort_unstable();
        sample
    };
    if pairs.is_empty() {
        return 0.0;
    }

    let sum: f64 = pairs
        .iter()
        .map(|&pair| {
            let (i, j) = unrank_pair(pair, n);
            jaccard_distance(&cluster_sets[i], &cluster_sets[j])
        })
        .sum();
    sum / pairs.len() as f64
}

/// Maps a pair rank in `0..n(n-1)/2` to `(i, j)` with `i < j`, ordered
/// row by row.
fn unrank_pair(mut rank: usize, n: usize) -> (usize, usize) {
    let mut i = 0;
    loop {
        let row = n - 1 - i;
        if rank < row {
            return (i, i + 1 + rank);
        }
        rank -= row;
        i += 1;
    }
}

fn jaccard_distance(a: &HashSet<ClusterId>, b: &HashSet<ClusterId>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    1.0 - shared as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn set(ids: &[usize]) -> HashSet<ClusterId> {
        ids.iter().map(|&id| ClusterId::new(id)).collect()
    }

    #[test]
    fn test_fewer_than_two_models() {
        let config = DiversityConfig::default();
        assert_eq!(diversity(&[], &config), 0.0);
        assert_eq!(diversity(&[set(&[1, 2])], &config), 0.0);
    }

    #[test]
    fn test_identical_and_disjoint() {
        let config = DiversityConfig::default();
        assert_eq!(diversity(&[set(&[1, 2]), set(&[1, 2])], &config), 0.0);
        assert_eq!(diversity(&[set(&[1]), set(&[2])], &config), 1.0);
        assert_eq!(diversity(&[set(&[]), set(&[])], &config), 0.0);
    }

    #[test]
    fn test_mean_over_all_pairs() {
        let config = DiversityConfig::default();
        // pairs: (a,b) 1 - 1/3, (a,c) 1.0, (b,c) 1 - 1/2
        let sets = [set(&[1, 2]), set(&[2, 3]), set(&[3])];
        let expected = ((1.0 - 1.0 / 3.0) + 1.0 + 0.5) / 3.0;
        assert_approx_eq!(f64, diversity(&sets, &config), expected);
    }

    #[test]
    fn test_unrank_pair() {
        let pairs: Vec<_> = (0..6).map(|rank| unrank_pair(rank, 4)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let config = DiversityConfig::new(10, 42);
        let sets: Vec<_> = (0..12).map(|i| set(&[i % 3, i % 5 + 10])).collect();

        let first = diversity(&sets, &config);
        let second = diversity(&sets, &config);
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn test_zero_pair_budget() {
        let config = DiversityConfig::new(0, 1);
        assert_eq!(diversity(&[set(&[1]), set(&[2])], &config), 0.0);
    }
}
