//! Bubble Core - Consent-Gated Multiverse Population Engine
//!
//! Simulates a population of "bubble" universes under stochastic
//! birth/death dynamics, where every transfer of invariants across a
//! bubble boundary is gated by a sovereignty policy:
//!
//! 1. **Dynamics**: inflation drift, logistic collapse hazard, tunnelling births
//! 2. **Ethics**: `closed | consensual | open` export policy with a strictness throttle
//! 3. **Audit**: one ledger record per attempted export, plus per-step metrics
//!
//! All randomness flows through [`bubble_env::RandomSource`], so a run is
//! reproducible from its seed.

pub mod arena;
pub mod bubble;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod ethics;
pub mod ledger;
pub mod metrics;
pub mod multiverse;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use arena::BubbleArena;
pub use bubble::{Bubble, BubbleId};
pub use config::{EthicsConfig, MultiverseConfig};
pub use error::ConfigError;
pub use ethics::{evaluate, EthicsEngine, ExportDecision, Policy, Reason};
pub use ledger::{EventKind, ExportEvent, Ledger};
pub use metrics::RunMetrics;
pub use multiverse::{Multiverse, StepReport};
