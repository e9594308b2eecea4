//! Core randomness trait for the simulation engines.

/// The single source of stochasticity for a run.
///
/// Engines never touch a global RNG; they take `&mut impl RandomSource`
/// so tests can inject scripted sequences and production runs can use a
/// seeded generator.
///
/// # Draw discipline
///
/// Each method advances the underlying state. Callers must issue draws in
/// a fixed order per step and per agent, otherwise two runs with the same
/// seed diverge.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Gaussian draw with the given mean and standard deviation.
    ///
    /// `std_dev = 0` returns `mean` exactly (one draw is still consumed).
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Bernoulli trial with success probability `p`.
    ///
    /// Consumes exactly one uniform draw: succeeds iff `uniform() < p`.
    fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Returns the seed this source was built from (for logging and exports).
    fn seed(&self) -> u64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        (**self).gaussian(mean, std_dev)
    }

    fn bernoulli(&mut self, p: f64) -> bool {
        (**self).bernoulli(p)
    }

    fn seed(&self) -> u64 {
        (**self).seed()
    }
}
