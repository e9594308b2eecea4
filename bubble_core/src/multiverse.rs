//! The run context: population, ledger, cumulative export and RNG.
//!
//! # Step protocol
//!
//! Every bubble live at the start of step `t` is visited once, in creation
//! order. Per bubble the draws are:
//!
//! 1. drift: one Gaussian
//! 2. production: no draw
//! 3. collapse hazard: one uniform; on collapse the bubble routes a
//!    `collapse` export and is done for the step
//! 4. tunnelling: one uniform; on success, unless the live population is
//!    at the cap, a child is created with one Gaussian (inflation), one
//!    uniform if consent is sampled fresh, and one Gaussian (proposal)
//!
//! Children born during step `t` are first visited at step `t + 1`.

use crate::arena::BubbleArena;
use crate::bubble::{Bubble, BubbleId};
use crate::config::MultiverseConfig;
use crate::dynamics;
use crate::error::ConfigError;
use crate::ethics::{clamp_proposal, EthicsEngine};
use crate::ledger::{EventKind, ExportEvent, Ledger};
use crate::metrics::RunMetrics;
use bubble_env::RandomSource;
use std::ops::Range;
use tracing::{debug, trace};

/// What happened during one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Metrics after the step
    pub metrics: RunMetrics,

    /// Children created
    pub births: usize,

    /// Bubbles that collapsed
    pub collapses: usize,

    /// Successful tunnelling trials dropped because the cap was reached
    pub births_skipped: usize,

    /// Ledger records appended during this step
    pub ledger_range: Range<usize>,
}

/// Event counts accumulated while a step runs.
#[derive(Debug, Default)]
struct StepTally {
    births: usize,
    collapses: usize,
    births_skipped: usize,
}

/// A single simulation run.
pub struct Multiverse<R: RandomSource> {
    config: MultiverseConfig,
    ethics: EthicsEngine,
    rng: R,
    arena: BubbleArena,
    ledger: Ledger,

    /// Steps completed
    t: u64,

    /// Sum of all granted exports
    exported_total: f64,
}

impl<R: RandomSource> Multiverse<R> {
    /// Validates the config and creates the seed population.
    ///
    /// Each seed bubble draws its inflation (Gaussian) then its consent
    /// (Bernoulli).
    pub fn new(config: MultiverseConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let ethics = EthicsEngine::new(config.policy, config.ethics);
        let mut arena = BubbleArena::new();
        for _ in 0..config.n_initial {
            let inflation = rng.gaussian(config.inf_mean, config.inf_sigma);
            let consent = ethics.sample_consent(&mut rng);
            arena.spawn(inflation, consent, None);
        }

        debug!(
            "Seeded multiverse: {} bubbles, policy={}, seed={}",
            arena.total(),
            config.policy,
            rng.seed()
        );

        Ok(Self {
            config,
            ethics,
            rng,
            arena,
            ledger: Ledger::new(),
            t: 0,
            exported_total: 0.0,
        })
    }

    /// Advances the run by one step.
    pub fn step(&mut self) -> StepReport {
        self.t += 1;
        let ledger_start = self.ledger.len();
        let mut tally = StepTally::default();

        let cohort = self.arena.live_ids_before(self.arena.total());
        for id in cohort {
            self.advance(id, &mut tally);
        }

        assert!(
            self.arena.live() <= self.config.max_bubbles,
            "live population {} exceeds cap {}",
            self.arena.live(),
            self.config.max_bubbles
        );

        trace!(
            "t={} births={} collapses={} skipped={}",
            self.t,
            tally.births,
            tally.collapses,
            tally.births_skipped
        );
        StepReport {
            metrics: self.metrics(),
            births: tally.births,
            collapses: tally.collapses,
            births_skipped: tally.births_skipped,
            ledger_range: ledger_start..self.ledger.len(),
        }
    }

    /// Runs `steps` steps and returns their metrics in order.
    pub fn run(&mut self, steps: u64) -> Vec<RunMetrics> {
        (0..steps).map(|_| self.step().metrics).collect()
    }

    /// Metrics for the current state.
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics::collect(self.t, &self.arena, self.exported_total)
    }

    fn advance(&mut self, id: BubbleId, tally: &mut StepTally) {
        let bubble = &mut self.arena[id];
        bubble.inflation = dynamics::drift(bubble.inflation, self.config.drift_sigma, &mut self.rng);
        bubble.credit(dynamics::production(bubble.inflation, &self.config));

        let hazard = dynamics::collapse_probability(bubble.inflation, &self.config);
        if self.rng.bernoulli(hazard) {
            self.collapse(id);
            tally.collapses += 1;
            return;
        }

        if !self.rng.bernoulli(self.config.tunnel_rate) {
            return;
        }
        if self.arena.live() >= self.config.max_bubbles {
            tally.births_skipped += 1;
            return;
        }
        self.birth(id);
        tally.births += 1;
    }

    fn collapse(&mut self, id: BubbleId) {
        let bubble = &self.arena[id];
        let available = bubble.invariants();
        let src_consents = bubble.consent;

        let proposed = clamp_proposal(dynamics::collapse_proposal(available, &self.config), available);
        let decision = self.ethics.decide(proposed, src_consents, None);
        if decision.allowed {
            self.transfer_out(id, decision.granted);
        }

        self.ledger.record(ExportEvent::new(
            self.t,
            EventKind::Collapse,
            id,
            None,
            proposed,
            self.config.policy,
            src_consents,
            None,
            decision,
        ));
        self.arena.collapse(id);

        debug!(
            "t={} collapse {} proposed={:.4} granted={:.4} ({})",
            self.t,
            id,
            proposed,
            decision.granted,
            decision.reason.code()
        );
    }

    fn birth(&mut self, parent: BubbleId) {
        let inflation = self.rng.gaussian(self.config.inf_mean, self.config.inf_sigma);
        let src_consents = self.arena[parent].consent;
        let child_consent = self.ethics.child_consent(src_consents, &mut self.rng);
        let raw = dynamics::birth_proposal(&self.config, &mut self.rng);

        let child = self.arena.spawn(inflation, child_consent, Some(parent));
        let proposed = clamp_proposal(raw, self.arena[parent].invariants());
        let decision = self.ethics.decide(proposed, src_consents, Some(child_consent));
        if decision.allowed {
            let (source, newborn) = self.arena.pair_mut(parent, child);
            debit_export(source, decision.granted);
            newborn.credit(decision.granted);
            self.exported_total += decision.granted;
        }

        self.ledger.record(ExportEvent::new(
            self.t,
            EventKind::Birth,
            parent,
            Some(child),
            proposed,
            self.config.policy,
            src_consents,
            Some(child_consent),
            decision,
        ));

        debug!(
            "t={} birth {} -> {} proposed={:.4} granted={:.4} ({})",
            self.t,
            parent,
            child,
            proposed,
            decision.granted,
            decision.reason.code()
        );
    }

    /// Debits `amount` from a source and adds it to the cumulative export.
    fn transfer_out(&mut self, source: BubbleId, amount: f64) {
        debit_export(&mut self.arena[source], amount);
        self.exported_total += amount;
    }

    /// Steps completed.
    pub fn t(&self) -> u64 {
        self.t
    }

    /// Sum of all granted exports so far.
    pub fn cumulative_export(&self) -> f64 {
        self.exported_total
    }

    pub fn config(&self) -> &MultiverseConfig {
        &self.config
    }

    pub fn arena(&self) -> &BubbleArena {
        &self.arena
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Seed of the underlying random source.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Consumes the run, returning its ledger.
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }
}

/// Removes an export from its source, which must hold at least `amount`.
fn debit_export(source: &mut Bubble, amount: f64) {
    assert!(
        amount <= source.invariants() + 1e-12,
        "export of {amount} exceeds invariants {} of {}",
        source.invariants(),
        source.id
    );
    source.debit(amount);
}
