//- level
//- --
//- Choosing how tall each element of the skip list stands.

//- Every element gets a height when it is inserted, and keeps it until it is removed. Height `1`
//- puts the element on the complete bottom lane only; each extra level adds a link in a sparser
//- "fast lane" above. Heights follow a geometric distribution: the chance of reaching level `k`
//- is `p^(k-1)`, and whatever would spill past the top level is folded into the top level.
//=

use rand::{Rng, RngCore};

use crate::config::SkipListConfig;

//- The Probability Table
//- ==
//=
//- Rather than calling `powf` on every insert, the powers of `p` are worked out once. Index `0`
//- holds `1.0`, so every lookup in the loop below reads a real entry.
pub fn probability_table(probability: f64, max_level: usize) -> Vec<f64> {
    std::iter::successors(Some(1.0), |prev| Some(prev * probability))
        .take(max_level)
        .collect()
}

//- The Generator
//- ==
//=
//- The random source is handed in by the caller instead of being seeded from the clock. Tests
//- pass a seeded or scripted generator and get the same heights on every run.
#[derive(Debug, Clone)]
pub struct LevelGenerator<R> {
    rng: R,
    table: Vec<f64>,
}

impl<R: RngCore> LevelGenerator<R> {
    /// Expects a configuration that has already passed [`SkipListConfig::validate`].
    pub fn new(config: &SkipListConfig, rng: R) -> Self {
        Self {
            rng,
            table: probability_table(config.probability, config.max_level),
        }
    }

//- One uniform draw `r` in `[0, 1)` decides the whole height. The height grows while `r` is
//- still below the chance of reaching the next level. So `r < p` gives at least 2, `r < p^2`
//- gives at least 3, and so on, capped at the table length.
    pub fn random_level(&mut self) -> usize {
        let r: f64 = self.rng.random();
        let mut level = 1;
        while level < self.table.len() && r < self.table[level] {
            level += 1;
        }
        level
    }
}

impl<R> LevelGenerator<R> {
    pub fn max_level(&self) -> usize {
        self.table.len()
    }

    pub fn probability_table(&self) -> &[f64] {
        &self.table
    }
}


#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::testing::{ScriptedRng, unit};
    use super::*;

    fn generator<R: RngCore>(rng: R) -> LevelGenerator<R> {
        LevelGenerator::new(&SkipListConfig::default(), rng)
    }

    #[test]
    fn table_holds_powers() {
        let table = probability_table(0.5, 5);
        assert_eq!(table, vec![1.0, 0.5, 0.25, 0.125, 0.0625]);

        let table = probability_table(1.0 / std::f64::consts::E, 18);
        assert_eq!(table.len(), 18);
        for (i, p) in table.iter().enumerate() {
            let expected = (-(i as f64)).exp();
            assert!((p - expected).abs() < 1e-12, "level {i}: {p} vs {expected}");
        }
    }

    #[test]
    fn scripted_heights() {
        let mut levels = generator(ScriptedRng::heights(&[1, 2, 3, 4, 18]));
        let drawn: Vec<usize> = (0..5).map(|_| levels.random_level()).collect();
        assert_eq!(drawn, vec![1, 2, 3, 4, 18]);
    }

    #[test]
    fn extreme_draws_stay_in_range() {
        struct Fixed(u64);
        impl RngCore for Fixed {
            fn next_u32(&mut self) -> u32 {
                (self.0 >> 32) as u32
            }
            fn next_u64(&mut self) -> u64 {
                self.0
            }
            fn fill_bytes(&mut self, dst: &mut [u8]) {
                dst.fill(0);
            }
        }

        // r = 0 climbs every level but stops at the top
        assert_eq!(generator(Fixed(0)).random_level(), 18);
        // r just under 1 never leaves the bottom
        assert_eq!(generator(Fixed(u64::MAX)).random_level(), 1);
        // a single level list only ever yields height 1
        let config = SkipListConfig::new(1, 0.5).unwrap();
        assert_eq!(LevelGenerator::new(&config, Fixed(0)).random_level(), 1);
        assert_eq!(unit(0.0), 0);
    }

    #[test]
    fn same_seed_same_heights() {
        let mut a = generator(StdRng::seed_from_u64(7));
        let mut b = generator(StdRng::seed_from_u64(7));
        for _ in 0..1_000 {
            assert_eq!(a.random_level(), b.random_level());
        }
    }

    #[test]
    fn heights_are_geometric() {
        let mut levels = generator(StdRng::seed_from_u64(42));
        let samples = 100_000;
        let mut at_least = [0usize; 19];
        for _ in 0..samples {
            let h = levels.random_level();
            assert!((1..=18).contains(&h));
            for count in at_least.iter_mut().take(h + 1).skip(1) {
                *count += 1;
            }
        }
        assert_eq!(at_least[1], samples);
        for k in 2..=5 {
            let expected = samples as f64 * levels.probability_table()[k - 1];
            let observed = at_least[k] as f64;
            assert!(
                (observed - expected).abs() < expected * 0.1,
                "height >= {k}: observed {observed}, expected {expected}"
            );
        }
    }
}
