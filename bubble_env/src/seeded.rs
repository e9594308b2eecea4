//! ChaCha8-backed random source.

use crate::source::RandomSource;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Seeded random source for deterministic runs.
///
/// Backed by `ChaCha8Rng`, whose output stream is stable across platforms
/// and crate patch releases.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    /// Master seed for this run
    seed: u64,

    /// Generator state
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source from an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a source from ambient entropy.
    ///
    /// The freshly drawn seed is kept, so `seed()` still reports a value
    /// that reproduces this run.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    /// Creates a source from an optional seed, falling back to entropy.
    pub fn from_optional(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

/// Derives an independent sub-seed from a master seed and a stream index.
///
/// Used by seed sweeps so neighbouring streams do not share a prefix.
pub fn derive_seed(master: u64, stream: u64) -> u64 {
    master
        .wrapping_mul(0x9e3779b97f4a7c15) // Golden ratio prime
        .wrapping_add(stream.wrapping_mul(0x517cc1b727220a95))
}
