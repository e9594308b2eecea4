//! Named parameter presets for common experiments.

use bubble_core::{MultiverseConfig, Policy};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Defaults, untouched
    Baseline,

    /// Closed policy: nothing ever leaves a bubble
    SealedVacuum,

    /// Consensual policy with consent sampled fresh for every child
    ConsentCommons,

    /// Open policy with aggressive tunnelling
    OpenFrontier,

    /// Consensual policy throttled to 30% of every proposal
    StrictCustodian,

    /// Steep, early-onset collapse hazard
    FalseVacuum,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Baseline,
            ScenarioId::SealedVacuum,
            ScenarioId::ConsentCommons,
            ScenarioId::OpenFrontier,
            ScenarioId::StrictCustodian,
            ScenarioId::FalseVacuum,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "baseline",
            ScenarioId::SealedVacuum => "sealed_vacuum",
            ScenarioId::ConsentCommons => "consent_commons",
            ScenarioId::OpenFrontier => "open_frontier",
            ScenarioId::StrictCustodian => "strict_custodian",
            ScenarioId::FalseVacuum => "false_vacuum",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "Default parameters, closed policy",
            ScenarioId::SealedVacuum => "Closed policy: every export refused, Δℰ stays 0",
            ScenarioId::ConsentCommons => "Consensual policy, children sample their own consent",
            ScenarioId::OpenFrontier => "Open policy, 20% tunnelling per step",
            ScenarioId::StrictCustodian => "Consensual policy, strictness 0.3",
            ScenarioId::FalseVacuum => "Hazard ceiling 0.3 with onset below mean inflation",
        }
    }

    /// Layers this scenario's parameters on top of `base`.
    pub fn apply(&self, base: MultiverseConfig) -> MultiverseConfig {
        let mut config = base;
        match self {
            ScenarioId::Baseline => {}
            ScenarioId::SealedVacuum => {
                config.policy = Policy::Closed;
            }
            ScenarioId::ConsentCommons => {
                config.policy = Policy::Consensual;
                config.ethics.inherit_consent = false;
            }
            ScenarioId::OpenFrontier => {
                config.policy = Policy::Open;
                config.tunnel_rate = 0.2;
            }
            ScenarioId::StrictCustodian => {
                config.policy = Policy::Consensual;
                config.ethics.strictness = 0.3;
            }
            ScenarioId::FalseVacuum => {
                config.decay_rate = 0.3;
                config.decay_inflection = 1.0;
                config.decay_slope = 6.0;
            }
        }
        config
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "baseline" | "default" => Ok(ScenarioId::Baseline),
            "sealed_vacuum" | "sealed" => Ok(ScenarioId::SealedVacuum),
            "consent_commons" | "commons" => Ok(ScenarioId::ConsentCommons),
            "open_frontier" | "frontier" => Ok(ScenarioId::OpenFrontier),
            "strict_custodian" | "custodian" => Ok(ScenarioId::StrictCustodian),
            "false_vacuum" => Ok(ScenarioId::FalseVacuum),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
