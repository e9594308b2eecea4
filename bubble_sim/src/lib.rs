//! Bubble Multiverse Simulation Harness
//!
//! Drives [`bubble_core::Multiverse`] for a fixed number of steps, audits
//! the run against its invariants and hands the results to the outside
//! world as CSV, JSONL and JSON.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        SimRunner                         │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │ Multiverse (arena + ledger + Δℰ + RandomSource)    │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │        │ RunMetrics per step        │ ExportEvents       │
//! │   ┌────▼─────┐                 ┌────▼─────┐              │
//! │   │ history  │                 │  ledger  │              │
//! │   └────┬─────┘                 └────┬─────┘              │
//! │        └──────────┬─────────────────┘                    │
//! │             ┌─────▼─────┐                                │
//! │             │ RunReport │──► audit() ──► exporter        │
//! │             └───────────┘                                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use bubble_core::{MultiverseConfig, Policy};
//! use bubble_sim::SimRunner;
//!
//! let config = MultiverseConfig::default().with_policy(Policy::Open);
//! let report = SimRunner::new(config).with_steps(20).run_seeded(Some(42)).unwrap();
//!
//! assert_eq!(report.history.len(), 21);
//! assert!(report.passed());
//! ```

mod error;
pub mod exporter;
pub mod runner;
pub mod scenarios;

pub use error::SimError;
pub use exporter::{LedgerSummary, RunExport};
pub use runner::{run_sweep, InvariantViolation, RunReport, SimRunner};
pub use scenarios::ScenarioId;
