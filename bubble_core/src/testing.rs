//! Scripted random source for pinning exact draw sequences in tests.

use bubble_env::RandomSource;
use std::collections::VecDeque;

/// Replays queued values; uniform draws default to 0.5 and Gaussian
/// draws to the mean once their queue runs dry.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    uniforms: VecDeque<f64>,
    /// Standard-normal z values
    normals: VecDeque<f64>,
    pub uniform_draws: usize,
    pub gaussian_draws: usize,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uniforms(mut self, values: &[f64]) -> Self {
        self.uniforms.extend(values);
        self
    }

    pub fn with_normals(mut self, values: &[f64]) -> Self {
        self.normals.extend(values);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self) -> f64 {
        self.uniform_draws += 1;
        self.uniforms.pop_front().unwrap_or(0.5)
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        self.gaussian_draws += 1;
        mean + std_dev * self.normals.pop_front().unwrap_or(0.0)
    }

    fn seed(&self) -> u64 {
        0
    }
}
