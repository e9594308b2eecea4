//! Run configuration and validation.

use crate::error::ConfigError;
use crate::ethics::Policy;
use serde::{Deserialize, Serialize};

/// Consent and throttle settings for the Export/Ethics Engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EthicsConfig {
    /// Probability a freshly sampled bubble opts in to exports
    pub consent_prob: f64,

    /// Children copy their parent's consent instead of sampling it
    pub inherit_consent: bool,

    /// Multiplier in [0, 1] applied to every allowed export
    pub strictness: f64,
}

impl Default for EthicsConfig {
    fn default() -> Self {
        Self {
            consent_prob: 0.85,
            inherit_consent: false,
            strictness: 1.0,
        }
    }
}

/// Configuration for a multiverse run.
///
/// Every field has a default, so a JSON file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiverseConfig {
    /// Size of the seed population
    pub n_initial: usize,

    /// Export policy mode
    pub policy: Policy,

    /// Consent sampling, inheritance and strictness
    pub ethics: EthicsConfig,

    // --- Dynamics ---
    /// Std-dev of the per-step inflation drift
    pub drift_sigma: f64,

    /// Per-step tunnelling (birth) probability of a live bubble
    pub tunnel_rate: f64,

    /// Ceiling of the collapse hazard
    pub decay_rate: f64,

    /// Inflation at which the hazard reaches half its ceiling
    pub decay_inflection: f64,

    /// Steepness of the logistic hazard
    pub decay_slope: f64,

    /// Mean inflation of new bubbles
    pub inf_mean: f64,

    /// Std-dev of the inflation of new bubbles
    pub inf_sigma: f64,

    /// Hard cap on the live population
    pub max_bubbles: usize,

    // --- Production ---
    /// Invariants accrued per step regardless of inflation
    pub production_base: f64,

    /// Invariants accrued per step per unit of inflation
    pub production_gain: f64,

    // --- Exports ---
    /// Mean proposed export on birth
    pub birth_export_mean: f64,

    /// Std-dev of the proposed export on birth
    pub birth_export_sigma: f64,

    /// Fraction of invariants proposed for export on collapse
    pub collapse_export_frac: f64,
}

impl Default for MultiverseConfig {
    fn default() -> Self {
        Self {
            n_initial: 1,
            policy: Policy::Closed,
            ethics: EthicsConfig::default(),
            drift_sigma: 0.05,
            tunnel_rate: 0.05,
            decay_rate: 0.01,
            decay_inflection: 1.2,
            decay_slope: 2.0,
            inf_mean: 1.2,
            inf_sigma: 0.1,
            max_bubbles: 20_000,
            production_base: 0.05,
            production_gain: 0.15,
            birth_export_mean: 0.2,
            birth_export_sigma: 0.08,
            collapse_export_frac: 0.2,
        }
    }
}

impl MultiverseConfig {
    /// Sets the policy mode.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the seed population size.
    pub fn with_initial(mut self, n_initial: usize) -> Self {
        self.n_initial = n_initial;
        self
    }

    /// Rejects out-of-range probabilities, negative scales and an
    /// impossible population cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_probability("consent_prob", self.ethics.consent_prob)?;
        ConfigError::check_probability("strictness", self.ethics.strictness)?;
        ConfigError::check_probability("tunnel_rate", self.tunnel_rate)?;
        ConfigError::check_probability("decay_rate", self.decay_rate)?;
        ConfigError::check_probability("collapse_export_frac", self.collapse_export_frac)?;

        ConfigError::check_scale("drift_sigma", self.drift_sigma)?;
        ConfigError::check_scale("inf_sigma", self.inf_sigma)?;
        ConfigError::check_scale("birth_export_sigma", self.birth_export_sigma)?;
        ConfigError::check_scale("decay_slope", self.decay_slope)?;
        ConfigError::check_scale("production_base", self.production_base)?;
        ConfigError::check_scale("production_gain", self.production_gain)?;

        ConfigError::check_finite("inf_mean", self.inf_mean)?;
        ConfigError::check_finite("decay_inflection", self.decay_inflection)?;
        ConfigError::check_finite("birth_export_mean", self.birth_export_mean)?;

        if self.max_bubbles == 0 {
            return Err(ConfigError::EmptyCap);
        }
        if self.n_initial > self.max_bubbles {
            return Err(ConfigError::PopulationExceedsCap {
                initial: self.n_initial,
                cap: self.max_bubbles,
            });
        }
        Ok(())
    }
}
