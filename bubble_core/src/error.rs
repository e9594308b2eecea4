//! Error types for the bubble engine.

use thiserror::Error;

/// Configuration errors, detected before the first step.
///
/// Stochastic outcomes (a refused export, a skipped birth) are never
/// errors; they are recorded in the ledger or the step report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability lies outside `[0, 1]`
    #[error("{name} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    /// A scale parameter is negative
    #[error("{name} must be non-negative, got {value}")]
    NegativeScale { name: &'static str, value: f64 },

    /// A parameter is NaN or infinite
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// The seed population does not fit under the hard cap
    #[error("initial population {initial} exceeds the population cap {cap}")]
    PopulationExceedsCap { initial: usize, cap: usize },

    /// The hard cap leaves no room for any bubble
    #[error("population cap must be at least 1")]
    EmptyCap,
}

impl ConfigError {
    pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), Self> {
        Self::check_finite(name, value)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(Self::ProbabilityOutOfRange { name, value });
        }
        Ok(())
    }

    pub(crate) fn check_scale(name: &'static str, value: f64) -> Result<(), Self> {
        Self::check_finite(name, value)?;
        if value < 0.0 {
            return Err(Self::NegativeScale { name, value });
        }
        Ok(())
    }

    pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(Self::NonFinite { name, value });
        }
        Ok(())
    }
}
