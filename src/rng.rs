//! Uniform random numbers for AI decisions.
//!
//! The world owns its own [`GameRng`] so tests can seed it; [`rng()`] is the
//! process-wide instance for everything else, seeded from OS entropy on first use.

use std::sync::LazyLock;

use parking_lot::{Mutex, MutexGuard};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct GameRng(SmallRng);

impl GameRng {
    pub fn from_os_rng() -> Self {
        Self(SmallRng::from_os_rng())
    }

    /// A reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` for an empty range.
    pub fn int(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.0.random_range(lo..=hi)
    }

    /// Uniform float in `lo..hi`. Returns `lo` for an empty range.
    pub fn float(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.0.random_range(lo..hi)
    }

    pub fn coin_flip(&mut self) -> bool {
        self.0.random_bool(0.5)
    }

    /// A uniformly chosen element, or `None` when `items` is empty.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        items.choose(&mut self.0).copied()
    }
}

static GLOBAL_RNG: LazyLock<Mutex<GameRng>> = LazyLock::new(|| Mutex::new(GameRng::from_os_rng()));

/// Locks the process-wide generator. Do not hold the guard across frames.
pub fn rng() -> MutexGuard<'static, GameRng> {
    GLOBAL_RNG.lock()
}
