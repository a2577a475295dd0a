use rand::Rng;

/// Return a uniformly random permutation of `items` without mutating the input.
///
/// Fisher-Yates over a fresh copy: walk the index from the last element down
/// to 1 and swap with a uniformly chosen index in `[0, i]`. Empty and
/// single-element slices come back unchanged.
///
/// Production callers pass `rand::rng()`; tests inject a seeded source and
/// assert permutation properties rather than exact orderings.
#[must_use]
pub fn shuffle<T: Clone>(items: &[T], rng: &mut impl Rng) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_and_singleton_are_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(shuffle::<u64>(&[], &mut rng), Vec::<u64>::new());
        assert_eq!(shuffle(&[42], &mut rng), vec![42]);
    }

    #[test]
    fn yields_a_permutation_of_the_input() {
        let items: Vec<u64> = (0..50).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let shuffled = shuffle(&items, &mut rng);

        assert_eq!(shuffled.len(), items.len());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }

    #[test]
    fn does_not_mutate_the_input() {
        let items: Vec<u64> = (0..10).collect();
        let before = items.clone();
        let mut rng = StdRng::seed_from_u64(3);

        let _ = shuffle(&items, &mut rng);

        assert_eq!(items, before);
    }

    #[test]
    fn seeded_source_makes_the_order_reproducible() {
        let items: Vec<u64> = (0..20).collect();

        let first = shuffle(&items, &mut StdRng::seed_from_u64(11));
        let second = shuffle(&items, &mut StdRng::seed_from_u64(11));

        assert_eq!(first, second);
    }
}
