//! Second-index selection for the SMO pair update

use rand::Rng;

/// Draws the partner index `j` for a KKT-violating sample `i`
///
/// `j` is uniform over `[0, n)` with `j != i`, sampled by rejection exactly
/// like the textbook simplified SMO. The random source is borrowed from the
/// caller so seeding stays under their control.
pub struct PairSelector<'r, R: Rng + ?Sized> {
    rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> PairSelector<'r, R> {
    pub fn new(rng: &'r mut R) -> Self {
        Self { rng }
    }

    /// Pick a partner for `i` among `n` samples, or `None` when `n < 2`
    pub fn partner(&mut self, i: usize, n: usize) -> Option<usize> {
        if n < 2 {
            return None;
        }

        loop {
            let j = self.rng.gen_range(0..n);
            if j != i {
                return Some(j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_partner_never_equals_i() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut selector = PairSelector::new(&mut rng);

        for i in 0..5 {
            for _ in 0..200 {
                let j = selector.partner(i, 5).unwrap();
                assert_ne!(j, i);
                assert!(j < 5);
            }
        }
    }

    #[test]
    fn test_two_samples_always_pick_the_other() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = PairSelector::new(&mut rng);
        assert_eq!(selector.partner(0, 2), Some(1));
        assert_eq!(selector.partner(1, 2), Some(0));
    }

    #[test]
    fn test_single_sample_has_no_partner() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = PairSelector::new(&mut rng);
        assert_eq!(selector.partner(0, 1), None);
        assert_eq!(selector.partner(0, 0), None);
    }

    #[test]
    fn test_covers_every_other_index() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut selector = PairSelector::new(&mut rng);
        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[selector.partner(2, 4).unwrap()] = true;
        }
        assert_eq!(seen, [true, true, false, true]);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut selector = PairSelector::new(&mut rng);
            (0..20).map(|i| selector.partner(i % 6, 6)).collect::<Vec<_>>()
        };
        assert_eq!(draw(3), draw(3));
    }
}
