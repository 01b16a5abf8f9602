//! Distinct orderings drawn from a permutation space.
//!
//! Small spaces are enumerated and shuffled, so every permutation is used
//! once before any repeats. Large spaces are sampled with rejection, which
//! stays cheap because they are only used when the space is more than twice
//! the requested count.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// One ordering of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnOrdering {
    pub indices: Vec<usize>,

    /// The permutation space was exhausted and this ordering repeats an
    /// earlier one.
    pub repeated: bool,
}

/// `n!`, or `None` when it does not fit in a `u64`.
pub fn factorial(n: usize) -> Option<u64> {
    (2..=n as u64).try_fold(1u64, |acc, k| acc.checked_mul(k))
}

/// Draw `count` orderings of `0..n`.
///
/// When `count <= n!` the orderings are pairwise distinct. Beyond that the
/// full permutation set is cycled and the extra entries are flagged as
/// repeated.
pub fn draw_orderings<R: Rng + ?Sized>(
    n: usize,
    count: usize,
    enumeration_limit: u64,
    rng: &mut R,
) -> Vec<DrawnOrdering> {
    if count == 0 {
        return vec![];
    }

    let space = factorial(n);
    let enumerate = match space {
        Some(total) => total <= enumeration_limit || total <= (count as u64).saturating_mul(2),
        None => false,
    };

    if enumerate {
        let mut all = all_permutations(n);
        all.shuffle(rng);
        let total = all.len();
        tracing::trace!(n, count, total, "Enumerated permutation space");
        (0..count)
            .map(|i| DrawnOrdering {
                indices: all[i % total].clone(),
                repeated: i >= total,
            })
            .collect()
    } else {
        sample_distinct(n, count, rng)
    }
}

fn sample_distinct<R: Rng + ?Sized>(n: usize, count: usize, rng: &mut R) -> Vec<DrawnOrdering> {
    let mut seen: HashSet<Vec<usize>> = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    let mut candidate: Vec<usize> = (0..n).collect();
    let mut rejected = 0usize;

    while out.len() < count {
        candidate.shuffle(rng);
        if seen.insert(candidate.clone()) {
            out.push(DrawnOrdering {
                indices: candidate.clone(),
                repeated: false,
            });
        } else {
            rejected += 1;
        }
    }

    tracing::trace!(n, count, rejected, "Sampled distinct permutations");
    out
}

/// Every permutation of `0..n` in lexicographic order.
pub fn all_permutations(n: usize) -> Vec<Vec<usize>> {
    let mut current: Vec<usize> = (0..n).collect();
    let mut out = vec![current.clone()];
    while next_permutation(&mut current) {
        out.push(current.clone());
    }
    out
}

/// Advance `items` to the next lexicographic permutation.
/// Returns `false` (leaving `items` untouched) when already at the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let Some(pivot) = (0..items.len() - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        return false;
    };
    let Some(successor) = (pivot + 1..items.len())
        .rev()
        .find(|&j| items[j] > items[pivot])
    else {
        return false;
    };

    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), Some(1));
        assert_eq!(factorial(1), Some(1));
        assert_eq!(factorial(4), Some(24));
        assert_eq!(factorial(20), Some(2_432_902_008_176_640_000));
        assert_eq!(factorial(21), None);
    }

    #[test]
    fn test_all_permutations_of_three() {
        let perms = all_permutations(3);
        assert_eq!(
            perms,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[test]
    fn test_full_space_is_drawn_without_repeats() {
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = draw_orderings(4, 24, 40_320, &mut rng);
        let unique: HashSet<_> = drawn.iter().map(|d| d.indices.clone()).collect();
        assert_eq!(unique.len(), 24);
        assert!(drawn.iter().all(|d| !d.repeated));
    }

    #[test]
    fn test_overflow_cycles_and_flags_repeats() {
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = draw_orderings(3, 8, 40_320, &mut rng);
        assert_eq!(drawn.len(), 8);
        assert_eq!(drawn.iter().filter(|d| d.repeated).count(), 2);
        assert_eq!(drawn[6].indices, drawn[0].indices);
        assert_eq!(drawn[7].indices, drawn[1].indices);
    }

    #[test]
    fn test_rejection_sampling_for_large_spaces() {
        let mut rng = StdRng::seed_from_u64(11);
        let drawn = draw_orderings(12, 50, 40_320, &mut rng);
        let unique: HashSet<_> = drawn.iter().map(|d| d.indices.clone()).collect();
        assert_eq!(unique.len(), 50);
        for d in &drawn {
            let mut sorted = d.indices.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..12).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_same_seed_same_draw() {
        let a = draw_orderings(5, 10, 40_320, &mut StdRng::seed_from_u64(3));
        let b = draw_orderings(5, 10, 40_320, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_element_space() {
        let drawn = draw_orderings(1, 3, 40_320, &mut StdRng::seed_from_u64(0));
        assert!(drawn.iter().all(|d| d.indices == vec![0]));
        assert_eq!(drawn.iter().filter(|d| d.repeated).count(), 2);
    }
}
