//! Recursive Partitioner (spec §4.2): shuffle once, then split into
//! balanced subgroups. Generic over the item type so it serves both level 0
//! (original participants) and promoted levels (synthetic items carrying a
//! winning statement and the set of original positions behind it).

use delib_core::DeliberationRng;

/// `⌈n / maxGroupSize⌉` groups whose sizes differ by at most one, largest
/// groups first (spec §4.2: "first `|items| mod |groups|` groups get
/// `base + 1`").
pub fn balanced_group_sizes(n: usize, max_group_size: usize) -> Vec<usize> {
    assert!(max_group_size >= 1, "max_group_size must be at least 1");
    if n == 0 {
        return Vec::new();
    }
    let num_groups = (n + max_group_size - 1) / max_group_size;
    let base = n / num_groups;
    let remainder = n % num_groups;
    (0..num_groups)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Shuffle `items` once with `rng`, then split into balanced groups per
/// `balanced_group_sizes`. When `items.len() <= max_group_size` this returns
/// a single group holding the shuffled order (spec §4.2).
pub fn partition<T: Clone>(items: &[T], max_group_size: usize, rng: &mut DeliberationRng) -> Vec<Vec<T>> {
    let shuffled = rng.shuffled(items);
    let sizes = balanced_group_sizes(items.len(), max_group_size);
    let mut groups = Vec::with_capacity(sizes.len());
    let mut cursor = 0;
    for size in sizes {
        groups.push(shuffled[cursor..cursor + size].to_vec());
        cursor += size;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_group_when_within_cap() {
        let sizes = balanced_group_sizes(8, 12);
        assert_eq!(sizes, vec![8]);
    }

    #[test]
    fn splits_into_balanced_groups() {
        // spec S6: 25 items, cap 12 -> ceil(25/12) = 3 groups of sizes 9,8,8.
        let sizes = balanced_group_sizes(25, 12);
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes.iter().sum::<usize>(), 25);
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }

    #[test]
    fn exact_multiple_splits_evenly() {
        let sizes = balanced_group_sizes(24, 12);
        assert_eq!(sizes, vec![12, 12]);
    }

    #[test]
    fn partition_preserves_every_item_exactly_once() {
        let items: Vec<u32> = (0..25).collect();
        let mut rng = DeliberationRng::from_seed_u64(11);
        let groups = partition(&items, 12, &mut rng);
        assert_eq!(groups.len(), 3);
        let mut seen: Vec<u32> = groups.into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, items);
    }

    #[test]
    fn partition_is_deterministic_given_seed() {
        let items: Vec<u32> = (0..10).collect();
        let mut rng_a = DeliberationRng::from_seed_u64(5);
        let mut rng_b = DeliberationRng::from_seed_u64(5);
        let groups_a = partition(&items, 4, &mut rng_a);
        let groups_b = partition(&items, 4, &mut rng_b);
        assert_eq!(groups_a, groups_b);
    }

    #[test]
    fn single_item_groups_when_cap_is_one() {
        let items: Vec<u32> = (0..4).collect();
        let mut rng = DeliberationRng::from_seed_u64(3);
        let groups = partition(&items, 1, &mut rng);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    proptest! {
        /// Every item appears exactly once across the partition, group sizes
        /// sum to the input length, and no two groups differ in size by more
        /// than one — regardless of item count, cap, or seed.
        #[test]
        fn balance_holds_for_any_input(
            n in 0usize..200,
            max_group_size in 1usize..30,
            seed in any::<u64>(),
        ) {
            let items: Vec<u32> = (0..n as u32).collect();
            let mut rng = DeliberationRng::from_seed_u64(seed);
            let groups = partition(&items, max_group_size, &mut rng);

            let total: usize = groups.iter().map(Vec::len).sum();
            prop_assert_eq!(total, n);

            let mut seen: Vec<u32> = groups.iter().flatten().copied().collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, items);

            if let (Some(max), Some(min)) = (
                groups.iter().map(Vec::len).max(),
                groups.iter().map(Vec::len).min(),
            ) {
                prop_assert!(max - min <= 1);
            }
        }
    }
}
