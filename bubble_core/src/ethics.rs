//! Export/Ethics Engine
//! =====================
//!
//! Decides whether a proposed export of invariants may cross a bubble
//! boundary, and how much of it is granted.
//!
//! | policy       | allowed when                                   | granted                  |
//! |--------------|------------------------------------------------|--------------------------|
//! | `closed`     | never                                          | 0                        |
//! | `consensual` | source consents and (no destination or it does)| `proposed * strictness`  |
//! | `open`       | always                                         | `proposed * strictness`  |
//!
//! Strictness only scales the granted amount; it never flips the decision.

use crate::config::EthicsConfig;
use bubble_env::RandomSource;
use serde::{Deserialize, Serialize};

/// Sovereignty policy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// No cross-boundary export, ever
    #[default]
    Closed,

    /// Export only with consent of every party involved
    Consensual,

    /// Export always allowed
    Open,
}

impl Policy {
    /// Returns all policy modes.
    pub fn all() -> [Policy; 3] {
        [Policy::Closed, Policy::Consensual, Policy::Open]
    }

    /// Returns the policy name as recorded in the ledger.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Closed => "closed",
            Policy::Consensual => "consensual",
            Policy::Open => "open",
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "closed" => Ok(Policy::Closed),
            "consensual" => Ok(Policy::Consensual),
            "open" => Ok(Policy::Open),
            _ => Err(format!("Unknown policy: {} (expected closed, consensual or open)", s)),
        }
    }
}

/// Why an export was granted or refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Ok,
    PolicyClosed,
    NoConsent,
}

impl Reason {
    /// Returns the reason code as recorded in the ledger.
    pub fn code(&self) -> &'static str {
        match self {
            Reason::Ok => "ok",
            Reason::PolicyClosed => "policy_closed",
            Reason::NoConsent => "no_consent",
        }
    }
}

/// Outcome of one export evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportDecision {
    pub allowed: bool,
    pub granted: f64,
    pub reason: Reason,
}

impl ExportDecision {
    fn refuse(reason: Reason) -> Self {
        Self {
            allowed: false,
            granted: 0.0,
            reason,
        }
    }

    fn grant(amount: f64) -> Self {
        Self {
            allowed: true,
            granted: amount.max(0.0),
            reason: Reason::Ok,
        }
    }
}

/// Evaluates a proposed export.
///
/// `dst_consents` is `None` when there is no destination bubble (collapse
/// exports go "outside").
pub fn evaluate(
    policy: Policy,
    proposed: f64,
    src_consents: bool,
    dst_consents: Option<bool>,
    strictness: f64,
) -> ExportDecision {
    match policy {
        Policy::Closed => ExportDecision::refuse(Reason::PolicyClosed),
        Policy::Open => ExportDecision::grant(proposed * strictness),
        Policy::Consensual => {
            if src_consents && dst_consents.unwrap_or(true) {
                ExportDecision::grant(proposed * strictness)
            } else {
                ExportDecision::refuse(Reason::NoConsent)
            }
        }
    }
}

/// Clamps a raw proposal so it cannot exceed what the source holds.
pub fn clamp_proposal(raw: f64, available: f64) -> f64 {
    raw.max(0.0).min(available.max(0.0))
}

/// Policy plus consent settings, bound together for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EthicsEngine {
    pub policy: Policy,
    pub config: EthicsConfig,
}

impl EthicsEngine {
    /// Creates an engine for the given policy and settings.
    pub fn new(policy: Policy, config: EthicsConfig) -> Self {
        Self { policy, config }
    }

    /// Samples a fresh consent flag (one Bernoulli draw).
    pub fn sample_consent<R: RandomSource>(&self, rng: &mut R) -> bool {
        rng.bernoulli(self.config.consent_prob)
    }

    /// Consent for a newborn: inherited without a draw, or freshly sampled.
    pub fn child_consent<R: RandomSource>(&self, parent_consent: bool, rng: &mut R) -> bool {
        if self.config.inherit_consent {
            parent_consent
        } else {
            self.sample_consent(rng)
        }
    }

    /// Evaluates an export under this engine's policy and strictness.
    pub fn decide(&self, proposed: f64, src_consents: bool, dst_consents: Option<bool>) -> ExportDecision {
        evaluate(self.policy, proposed, src_consents, dst_consents, self.config.strictness)
    }
}
