use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Random source behind every random-selection point (coin, dice, jokes,
/// default replies). Seedable so tests can inject determinism.
pub struct Roller(StdRng);

impl Roller {
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Uniform integer in `[min, max]` inclusive. Bounds are normalized if
    /// given in reverse order so a caller can never trigger a panic.
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.0.random_range(lo..=hi)
    }

    pub fn coin(&mut self) -> bool {
        self.0.random_bool(0.5)
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        items.choose(&mut self.0).expect("pick from empty slice")
    }
}

impl Default for Roller {
    fn default() -> Self {
        Self::new()
    }
}
