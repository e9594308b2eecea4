//! Batch runner - drives a multiverse for a fixed number of steps and
//! audits the outcome.

use bubble_core::{ConfigError, Ledger, Multiverse, MultiverseConfig, Policy, RunMetrics};
use bubble_env::{derive_seed, RandomSource, SeededRandom};
use thiserror::Error;
use tracing::{info, warn};

/// Tolerance for float comparisons in the audit.
const EPSILON: f64 = 1e-9;

/// Most history entries reserved before a run; longer runs grow on demand.
const HISTORY_RESERVE: usize = 4096;

/// Results from running a multiverse.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Seed of the random source
    pub seed: u64,

    /// Steps executed
    pub steps: u64,

    /// Configuration the run used
    pub config: MultiverseConfig,

    /// Metrics for t = 0..=steps
    pub history: Vec<RunMetrics>,

    /// Every attempted export
    pub ledger: Ledger,

    /// Children created
    pub births: usize,

    /// Bubbles collapsed
    pub collapses: usize,

    /// Births dropped at the population cap
    pub births_skipped: usize,
}

impl RunReport {
    /// Metrics after the last step.
    pub fn final_metrics(&self) -> Option<&RunMetrics> {
        self.history.last()
    }

    /// Checks the run-level invariants over history and ledger.
    pub fn audit(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for window in self.history.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            if next.cumulative_export + EPSILON < prev.cumulative_export {
                violations.push(InvariantViolation::ExportDecreased {
                    t: next.t,
                    from: prev.cumulative_export,
                    to: next.cumulative_export,
                });
            }
            if next.universes_total < prev.universes_total {
                violations.push(InvariantViolation::TotalDecreased { t: next.t });
            }
        }

        for m in &self.history {
            if !(0.0..=1.0).contains(&m.rci) {
                violations.push(InvariantViolation::RciOutOfBounds { t: m.t, rci: m.rci });
            }
            if m.universes_total == 0 && m.rci != 0.0 {
                violations.push(InvariantViolation::RciOutOfBounds { t: m.t, rci: m.rci });
            }
            if m.universes_stable > m.universes_total {
                violations.push(InvariantViolation::StableExceedsTotal {
                    t: m.t,
                    stable: m.universes_stable,
                    total: m.universes_total,
                });
            }
            if m.universes_stable > self.config.max_bubbles {
                violations.push(InvariantViolation::CapExceeded {
                    t: m.t,
                    live: m.universes_stable,
                    cap: self.config.max_bubbles,
                });
            }
        }

        let strictness = self.config.ethics.strictness;
        for (index, event) in self.ledger.events().iter().enumerate() {
            if event.granted < 0.0 || event.granted > event.proposed + EPSILON {
                violations.push(InvariantViolation::GrantOutOfRange { index, granted: event.granted });
            }
            if !event.allowed && event.granted != 0.0 {
                violations.push(InvariantViolation::GrantOutOfRange { index, granted: event.granted });
            }
            match self.config.policy {
                Policy::Closed if event.allowed => {
                    violations.push(InvariantViolation::ClosedExportAllowed { index });
                }
                Policy::Open => {
                    let expected = event.proposed * strictness;
                    if !event.allowed || (event.granted - expected).abs() > EPSILON {
                        violations.push(InvariantViolation::OpenGrantMismatch {
                            index,
                            expected,
                            granted: event.granted,
                        });
                    }
                }
                _ => {}
            }
        }

        let granted = self.ledger.total_granted();
        if let Some(last) = self.final_metrics() {
            if (last.cumulative_export - granted).abs() > EPSILON * (1.0 + granted) {
                violations.push(InvariantViolation::LedgerMismatch {
                    ledger: granted,
                    metrics: last.cumulative_export,
                });
            }
        }

        violations
    }

    /// True when the audit finds nothing.
    pub fn passed(&self) -> bool {
        self.audit().is_empty()
    }
}

/// A broken run-level invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("t={t}: cumulative export fell from {from} to {to}")]
    ExportDecreased { t: u64, from: f64, to: f64 },

    #[error("t={t}: universes_total decreased")]
    TotalDecreased { t: u64 },

    #[error("t={t}: RCI {rci} out of bounds")]
    RciOutOfBounds { t: u64, rci: f64 },

    #[error("t={t}: {stable} stable bubbles out of {total} total")]
    StableExceedsTotal { t: u64, stable: usize, total: usize },

    #[error("t={t}: {live} live bubbles exceed cap {cap}")]
    CapExceeded { t: u64, live: usize, cap: usize },

    #[error("ledger[{index}]: granted {granted} outside [0, proposed]")]
    GrantOutOfRange { index: usize, granted: f64 },

    #[error("ledger[{index}]: export allowed under closed policy")]
    ClosedExportAllowed { index: usize },

    #[error("ledger[{index}]: open policy granted {granted}, expected {expected}")]
    OpenGrantMismatch { index: usize, expected: f64, granted: f64 },

    #[error("ledger grants {ledger} but metrics report {metrics}")]
    LedgerMismatch { ledger: f64, metrics: f64 },
}

/// Initial history reservation: one entry per step plus t = 0, capped.
fn history_capacity(steps: u64) -> usize {
    usize::try_from(steps).map_or(HISTORY_RESERVE, |n| n.min(HISTORY_RESERVE)) + 1
}

/// Runs a multiverse for a fixed number of steps.
pub struct SimRunner {
    /// Run configuration
    config: MultiverseConfig,

    /// Steps to execute
    steps: u64,

    /// Log metrics every N steps (0 = only the final step)
    print_every: u64,
}

impl SimRunner {
    /// Creates a new runner (100 steps, quiet).
    pub fn new(config: MultiverseConfig) -> Self {
        Self {
            config,
            steps: 100,
            print_every: 0,
        }
    }

    /// Sets the number of steps.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the metrics logging interval.
    pub fn with_print_every(mut self, every: u64) -> Self {
        self.print_every = every;
        self
    }

    /// Runs with an explicit random source.
    pub fn run<R: RandomSource>(&self, rng: R) -> Result<RunReport, ConfigError> {
        let seed = rng.seed();
        let mut world = Multiverse::new(self.config.clone(), rng)?;

        info!(
            "Starting run: {} steps, {} bubbles, policy={} (seed={})",
            self.steps,
            self.config.n_initial,
            self.config.policy,
            seed
        );

        let mut history = Vec::with_capacity(history_capacity(self.steps));
        history.push(world.metrics());
        if self.print_every > 0 {
            log_metrics(&history[0]);
        }

        let (mut births, mut collapses, mut births_skipped) = (0, 0, 0);
        for step in 1..=self.steps {
            let report = world.step();
            births += report.births;
            collapses += report.collapses;
            births_skipped += report.births_skipped;
            history.push(report.metrics);

            if self.print_every > 0 && (step % self.print_every == 0 || step == self.steps) {
                log_metrics(&report.metrics);
            }
        }

        if births_skipped > 0 {
            warn!(
                "Population cap {} reached: {} births skipped",
                self.config.max_bubbles, births_skipped
            );
        }

        Ok(RunReport {
            seed,
            steps: self.steps,
            config: self.config.clone(),
            history,
            ledger: world.into_ledger(),
            births,
            collapses,
            births_skipped,
        })
    }

    /// Runs with a seeded source, or entropy when `seed` is `None`.
    pub fn run_seeded(&self, seed: Option<u64>) -> Result<RunReport, ConfigError> {
        self.run(SeededRandom::from_optional(seed))
    }
}

/// Runs `seeds` independent runs derived from `base_seed`.
pub fn run_sweep(
    config: &MultiverseConfig,
    base_seed: u64,
    seeds: usize,
    steps: u64,
) -> Result<Vec<RunReport>, ConfigError> {
    let runner = SimRunner::new(config.clone()).with_steps(steps);
    (0..seeds as u64)
        .map(|i| runner.run(SeededRandom::new(derive_seed(base_seed, i))))
        .collect()
}

/// Logs one metrics record.
pub fn log_metrics(m: &RunMetrics) {
    info!(
        "t={} | total={} stable={} RCI={:.4} Δℰ={:.4} | mean_inflation={:.4} mean_invariants={:.4}",
        m.t,
        m.universes_total,
        m.universes_stable,
        m.rci,
        m.cumulative_export,
        m.mean_inflation,
        m.mean_invariants
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubble_core::EventKind;

    #[test]
    fn test_history_includes_seed_state() {
        let report = SimRunner::new(MultiverseConfig::default())
            .with_steps(10)
            .run_seeded(Some(1))
            .unwrap();

        assert_eq!(report.history.len(), 11);
        assert_eq!(report.history[0].t, 0);
        assert_eq!(report.final_metrics().unwrap().t, 10);
        assert_eq!(report.seed, 1);
    }

    #[test]
    fn test_counts_match_ledger() {
        let config = MultiverseConfig {
            n_initial: 3,
            tunnel_rate: 0.3,
            decay_rate: 0.2,
            ..Default::default()
        };
        let report = SimRunner::new(config).with_steps(30).run_seeded(Some(5)).unwrap();

        assert_eq!(report.births, report.ledger.count_kind(EventKind::Birth));
        assert_eq!(report.collapses, report.ledger.count_kind(EventKind::Collapse));
        let last = report.final_metrics().unwrap();
        assert_eq!(last.universes_total, 3 + report.births);
        assert_eq!(last.universes_stable, 3 + report.births - report.collapses);
    }

    #[test]
    fn test_audit_passes_for_real_runs() {
        for policy in Policy::all() {
            let config = MultiverseConfig {
                n_initial: 4,
                policy,
                tunnel_rate: 0.25,
                decay_rate: 0.15,
                max_bubbles: 60,
                ..Default::default()
            };
            let report = SimRunner::new(config).with_steps(60).run_seeded(Some(21)).unwrap();
            assert_eq!(report.audit(), vec![], "policy {}", policy);
        }
    }

    #[test]
    fn test_audit_flags_tampered_history() {
        let mut report = SimRunner::new(MultiverseConfig::default())
            .with_steps(3)
            .run_seeded(Some(1))
            .unwrap();
        report.history[2].cumulative_export = -1.0;
        report.history[3].universes_stable = report.history[3].universes_total + 1;

        let violations = report.audit();
        assert!(violations
            .iter()
            .any(|v| matches!(v, InvariantViolation::ExportDecreased { t: 2, .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, InvariantViolation::StableExceedsTotal { t: 3, .. })));
        assert!(!report.passed());
    }

    #[test]
    fn test_sweep_is_reproducible() {
        let config = MultiverseConfig {
            tunnel_rate: 0.2,
            ..Default::default()
        };
        let a = run_sweep(&config, 42, 3, 20).unwrap();
        let b = run_sweep(&config, 42, 3, 20).unwrap();

        assert_eq!(a.len(), 3);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.seed, y.seed);
            assert_eq!(x.history, y.history);
            assert_eq!(x.ledger, y.ledger);
        }
        assert_ne!(a[0].seed, a[1].seed);
    }

    #[test]
    fn test_huge_step_count_builds_runner() {
        let runner = SimRunner::new(MultiverseConfig::default()).with_steps(u64::MAX);

        assert_eq!(runner.steps, u64::MAX);
        assert_eq!(history_capacity(u64::MAX), HISTORY_RESERVE + 1);
        assert_eq!(history_capacity(10), 11);
    }

    #[test]
    fn test_zero_steps_records_seed_state_only() {
        let report = SimRunner::new(MultiverseConfig::default())
            .with_steps(0)
            .run_seeded(Some(4))
            .unwrap();

        assert_eq!(report.history.len(), 1);
        assert!(report.ledger.is_empty());
        assert!(report.passed());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let config = MultiverseConfig {
            decay_rate: 7.0,
            ..Default::default()
        };
        assert!(SimRunner::new(config).run_seeded(Some(1)).is_err());
    }
}
