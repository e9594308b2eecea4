//! Run-level properties over random seeds and parameters, plus fixed
//! reference scenarios.

use bubble_core::{EthicsConfig, EventKind, MultiverseConfig, Policy};
use bubble_sim::{RunReport, SimRunner};
use proptest::prelude::*;

fn run(config: MultiverseConfig, seed: u64, steps: u64) -> RunReport {
    SimRunner::new(config)
        .with_steps(steps)
        .run_seeded(Some(seed))
        .expect("valid config")
}

fn policy_strategy() -> impl Strategy<Value = Policy> {
    prop_oneof![Just(Policy::Closed), Just(Policy::Consensual), Just(Policy::Open)]
}

prop_compose! {
    fn config_strategy()(
        n_initial in 0usize..6,
        policy in policy_strategy(),
        consent_prob in 0.0f64..=1.0,
        inherit_consent in any::<bool>(),
        strictness in 0.0f64..=1.0,
        drift_sigma in 0.0f64..0.5,
        tunnel_rate in 0.0f64..0.4,
        decay_rate in 0.0f64..0.5,
        decay_slope in 0.0f64..5.0,
        max_bubbles in 6usize..80,
        collapse_export_frac in 0.0f64..=1.0,
        birth_export_mean in 0.0f64..0.5,
    ) -> MultiverseConfig {
        MultiverseConfig {
            n_initial,
            policy,
            ethics: EthicsConfig { consent_prob, inherit_consent, strictness },
            drift_sigma,
            tunnel_rate,
            decay_rate,
            decay_slope,
            max_bubbles,
            collapse_export_frac,
            birth_export_mean,
            ..Default::default()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_audit_holds(config in config_strategy(), seed in any::<u64>()) {
        let report = run(config, seed, 40);
        prop_assert_eq!(report.audit(), vec![]);
    }

    #[test]
    fn prop_cumulative_export_non_decreasing(config in config_strategy(), seed in any::<u64>()) {
        let report = run(config, seed, 40);
        for w in report.history.windows(2) {
            prop_assert!(w[1].cumulative_export >= w[0].cumulative_export);
        }
    }

    #[test]
    fn prop_population_bounds(config in config_strategy(), seed in any::<u64>()) {
        let cap = config.max_bubbles;
        let report = run(config, seed, 40);
        for m in &report.history {
            prop_assert!((0.0..=1.0).contains(&m.rci));
            prop_assert!(m.universes_stable <= m.universes_total);
            prop_assert!(m.universes_stable <= cap);
            if m.universes_total == 0 {
                prop_assert_eq!(m.rci, 0.0);
            }
        }
        for w in report.history.windows(2) {
            prop_assert!(w[1].universes_total >= w[0].universes_total);
        }
    }

    #[test]
    fn prop_closed_never_exports(config in config_strategy(), seed in any::<u64>()) {
        let config = config.with_policy(Policy::Closed);
        let report = run(config, seed, 40);
        for event in report.ledger.events() {
            prop_assert!(!event.allowed);
            prop_assert_eq!(event.granted, 0.0);
        }
        prop_assert!(report.history.iter().all(|m| m.cumulative_export == 0.0));
    }

    #[test]
    fn prop_open_grants_scaled_proposal(config in config_strategy(), seed in any::<u64>()) {
        let config = config.with_policy(Policy::Open);
        let strictness = config.ethics.strictness;
        let report = run(config, seed, 40);
        for event in report.ledger.events() {
            prop_assert!(event.allowed);
            prop_assert!((event.granted - event.proposed * strictness).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_same_seed_same_run(config in config_strategy(), seed in any::<u64>()) {
        let a = run(config.clone(), seed, 30);
        let b = run(config, seed, 30);
        prop_assert_eq!(a.history, b.history);
        prop_assert_eq!(a.ledger, b.ledger);
    }
}

#[test]
fn test_closed_single_bubble_exports_nothing() {
    let config = MultiverseConfig::default()
        .with_initial(1)
        .with_policy(Policy::Closed);
    let report = run(config, 42, 50);

    assert_eq!(report.ledger.allowed_count(), 0);
    assert_eq!(report.history.len(), 51);
    assert!(report.history.iter().all(|m| m.cumulative_export == 0.0));
}

#[test]
fn test_open_certain_tunnelling_no_decay() {
    let config = MultiverseConfig {
        n_initial: 1,
        policy: Policy::Open,
        ethics: EthicsConfig {
            strictness: 1.0,
            ..Default::default()
        },
        tunnel_rate: 1.0,
        decay_rate: 0.0,
        ..Default::default()
    };
    let report = run(config, 7, 5);

    // Every live bubble tunnels every step: 1 + 2 + 4 + 8 + 16 births
    assert_eq!(report.ledger.count_kind(EventKind::Birth), 31);
    assert_eq!(report.ledger.count_kind(EventKind::Collapse), 0);
    assert!(report.ledger.events().iter().all(|e| e.allowed));
    assert_eq!(report.final_metrics().unwrap().universes_total, 32);
}

#[test]
fn test_open_capped_tunnelling_five_births() {
    let config = MultiverseConfig {
        n_initial: 1,
        policy: Policy::Open,
        tunnel_rate: 1.0,
        decay_rate: 0.0,
        max_bubbles: 6,
        ..Default::default()
    };
    let report = run(config, 7, 5);

    // Step 1: 1 birth (2 live), step 2: 2 births (4 live), step 3: 2 births
    // before the cap of 6 is hit, steps 4-5: none.
    assert_eq!(report.ledger.count_kind(EventKind::Birth), 5);
    assert_eq!(report.ledger.count_kind(EventKind::Collapse), 0);
    assert!(report.ledger.events().iter().all(|e| e.allowed));
    assert_eq!(report.final_metrics().unwrap().universes_stable, 6);
    assert_eq!(report.births_skipped, 2 + 6 + 6);
}
