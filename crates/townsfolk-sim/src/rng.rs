//! Seedable random source shared by every subsystem of a world.
//!
//! A world owns exactly one [`SimRng`] and draws from it in a fixed
//! order each tick (agents in registry order, then the law system), so
//! the same seed and the same sequence of `update` calls replay the
//! same simulation.

use glam::Vec2;

/// Deterministic random number generator.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: fastrand::Rng,
    seed: u64,
}

impl SimRng {
    /// Creates a generator from a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
            seed,
        }
    }

    /// Seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.inner.f32()
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform value in `[min, max)`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.unit() * (max - min)
    }

    /// Uniform value in `[-spread, spread)`.
    pub fn spread(&mut self, spread: f32) -> f32 {
        (self.unit() - 0.5) * 2.0 * spread
    }

    /// Point jittered around `center` by up to `spread` on each axis.
    pub fn jitter(&mut self, center: Vec2, spread: f32) -> Vec2 {
        let dx = self.spread(spread);
        let dy = self.spread(spread);
        center + Vec2::new(dx, dy)
    }

    /// Either `1.0` or `-1.0`.
    pub fn sign(&mut self) -> f32 {
        if self.unit() < 0.5 {
            1.0
        } else {
            -1.0
        }
    }

    /// Uniform index in `0..len`. Returns `None` for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.inner.usize(..len))
    }

    /// Picks one element of a slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(0x5EED)
    }
}
