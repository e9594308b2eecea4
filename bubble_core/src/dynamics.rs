//! Dynamics Engine math: drift, production and collapse hazard.
//!
//! The per-agent state machine that sequences these terms lives in
//! [`crate::multiverse`]; everything here is deterministic given its
//! inputs, except [`drift`] which takes exactly one Gaussian draw.

use crate::config::MultiverseConfig;
use bubble_env::RandomSource;

/// Draws the next inflation value. Unclamped: inflation may go negative.
pub fn drift<R: RandomSource>(inflation: f64, drift_sigma: f64, rng: &mut R) -> f64 {
    inflation + rng.gaussian(0.0, drift_sigma)
}

/// Invariants accrued by a live bubble in one step, never negative.
pub fn production(inflation: f64, config: &MultiverseConfig) -> f64 {
    (config.production_base + config.production_gain * inflation).max(0.0)
}

/// Per-step collapse probability.
///
/// ```text
/// p = decay_rate / (1 + exp(-decay_slope * (inflation - decay_inflection)))
/// ```
///
/// Lies in `[0, decay_rate]` for a validated config.
pub fn collapse_probability(inflation: f64, config: &MultiverseConfig) -> f64 {
    let x = inflation - config.decay_inflection;
    let logistic = 1.0 / (1.0 + (-config.decay_slope * x).exp());
    (config.decay_rate * logistic).clamp(0.0, 1.0)
}

/// Raw (unclamped, floored) export proposal for a birth: one Gaussian draw.
pub fn birth_proposal<R: RandomSource>(config: &MultiverseConfig, rng: &mut R) -> f64 {
    rng.gaussian(config.birth_export_mean, config.birth_export_sigma).max(0.0)
}

/// Raw export proposal for a collapse.
pub fn collapse_proposal(invariants: f64, config: &MultiverseConfig) -> f64 {
    invariants * config.collapse_export_frac
}
