//! Bubble Multiverse Simulator CLI
//!
//! Run a seeded multiverse, write its metrics and export ledger, and audit
//! the result.

use bubble_core::{EventKind, MultiverseConfig, Policy};
use bubble_env::{RandomSource, SeededRandom};
use bubble_sim::exporter::{append_metrics_csv, dump_ledger};
use bubble_sim::runner::log_metrics;
use bubble_sim::{run_sweep, RunExport, RunReport, ScenarioId, SimError, SimRunner};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Bubble multiverse simulator with consent-gated exports
#[derive(Parser, Debug)]
#[command(name = "bubble-sim")]
#[command(about = "Multiverse bubble cosmology with CSV metrics and an export ledger", long_about = None)]
struct Args {
    /// Number of steps to run
    #[arg(long, default_value = "100")]
    steps: u64,

    /// Seed population size
    #[arg(long)]
    n_initial: Option<usize>,

    /// Master seed (absent = fresh entropy, reported in the logs)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log metrics every N steps (0 = final step only)
    #[arg(long, default_value = "0")]
    print_every: u64,

    /// Scenario preset (baseline, sealed_vacuum, consent_commons, open_frontier, strict_custodian, false_vacuum)
    #[arg(short = 'S', long, default_value = "baseline")]
    scenario: String,

    /// JSON file with configuration values (unset fields keep defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    // --- Policy / ethics ---
    /// Export policy: closed, consensual or open
    #[arg(long)]
    policy: Option<Policy>,

    /// Probability a bubble opts in to exports
    #[arg(long)]
    consent_prob: Option<f64>,

    /// Children inherit parent consent at birth (default: sample afresh)
    #[arg(long)]
    inherit_consent: Option<bool>,

    /// 0..1 throttle on allowed exports
    #[arg(long)]
    ethics_strictness: Option<f64>,

    // --- Dynamics ---
    #[arg(long)]
    drift_sigma: Option<f64>,

    #[arg(long)]
    tunnel_rate: Option<f64>,

    #[arg(long)]
    decay_rate: Option<f64>,

    #[arg(long)]
    decay_inflection: Option<f64>,

    #[arg(long)]
    decay_slope: Option<f64>,

    #[arg(long)]
    inf_mean: Option<f64>,

    #[arg(long)]
    inf_sigma: Option<f64>,

    /// Hard cap on the live population
    #[arg(long)]
    max_bubbles: Option<usize>,

    #[arg(long)]
    production_base: Option<f64>,

    #[arg(long)]
    production_gain: Option<f64>,

    // --- Exports ---
    #[arg(long)]
    birth_export_mean: Option<f64>,

    #[arg(long)]
    birth_export_sigma: Option<f64>,

    #[arg(long)]
    collapse_export_frac: Option<f64>,

    // --- Output ---
    /// Append per-step metrics to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the export ledger (JSONL)
    #[arg(long)]
    dump_ledger: Option<PathBuf>,

    /// Write the full run as JSON for external plotting
    #[arg(long)]
    export: Option<PathBuf>,

    /// Number of seeds to sweep (audit only, no file output)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Resolves the run configuration: file, then scenario, then flags.
    fn build_config(&self, scenario: ScenarioId) -> Result<MultiverseConfig, SimError> {
        let base = match &self.config {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => MultiverseConfig::default(),
        };
        let mut config = scenario.apply(base);

        if let Some(v) = self.n_initial {
            config.n_initial = v;
        }
        if let Some(v) = self.policy {
            config.policy = v;
        }
        if let Some(v) = self.consent_prob {
            config.ethics.consent_prob = v;
        }
        if let Some(v) = self.inherit_consent {
            config.ethics.inherit_consent = v;
        }
        if let Some(v) = self.ethics_strictness {
            config.ethics.strictness = v;
        }
        if let Some(v) = self.max_bubbles {
            config.max_bubbles = v;
        }

        let overrides = [
            (self.drift_sigma, &mut config.drift_sigma),
            (self.tunnel_rate, &mut config.tunnel_rate),
            (self.decay_rate, &mut config.decay_rate),
            (self.decay_inflection, &mut config.decay_inflection),
            (self.decay_slope, &mut config.decay_slope),
            (self.inf_mean, &mut config.inf_mean),
            (self.inf_sigma, &mut config.inf_sigma),
            (self.production_base, &mut config.production_base),
            (self.production_gain, &mut config.production_gain),
            (self.birth_export_mean, &mut config.birth_export_mean),
            (self.birth_export_sigma, &mut config.birth_export_sigma),
            (self.collapse_export_frac, &mut config.collapse_export_frac),
        ];
        for (value, field) in overrides {
            if let Some(v) = value {
                *field = v;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Runs the requested simulation(s); `Ok(false)` means an audit failed.
fn run(args: &Args) -> Result<bool, SimError> {
    let scenario: ScenarioId = args
        .scenario
        .parse()
        .map_err(|_| SimError::UnknownScenario(args.scenario.clone()))?;
    let config = args.build_config(scenario)?;

    if !args.json {
        info!("Bubble Multiverse Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("Scenario: {} - {}", scenario, scenario.description());
    }

    if args.seeds > 1 {
        return run_seed_sweep(args, scenario, &config);
    }

    let rng = SeededRandom::from_optional(args.seed);
    if args.seed.is_none() {
        info!("No seed given, using entropy seed {}", rng.seed());
    }

    let report = SimRunner::new(config)
        .with_steps(args.steps)
        .with_print_every(args.print_every)
        .run(rng)?;

    if let Some(path) = &args.csv {
        append_metrics_csv(path, &report.history)?;
        info!("Appended {} metrics rows to {}", report.history.len(), path.display());
    }
    if let Some(path) = &args.dump_ledger {
        dump_ledger(path, report.ledger.events())?;
        info!("Wrote {} ledger records to {}", report.ledger.len(), path.display());
    }

    let export = RunExport::from_report(scenario.name(), &report);
    if let Some(path) = &args.export {
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&report, &export))?);
    } else {
        if args.print_every == 0 {
            if let Some(last) = report.final_metrics() {
                log_metrics(last);
            }
        }
        info!(
            "Ledger: {} records, {} allowed ({} births, {} collapses)",
            export.ledger.records, export.ledger.allowed, export.ledger.births, export.ledger.collapses
        );
        for violation in &export.violations {
            warn!("  - {}", violation);
        }
        if export.passed {
            info!("✓ {} (seed={}) invariants hold", scenario, report.seed);
        } else {
            error!("✗ {} (seed={}) {} invariant violations", scenario, report.seed, export.violations.len());
        }
    }

    Ok(export.passed)
}

fn run_seed_sweep(args: &Args, scenario: ScenarioId, config: &MultiverseConfig) -> Result<bool, SimError> {
    let base_seed = args.seed.unwrap_or_else(|| SeededRandom::from_entropy().seed());
    let reports = run_sweep(config, base_seed, args.seeds, args.steps)?;

    let mut failed_count = 0;
    for report in &reports {
        let violations = report.audit();
        if violations.is_empty() {
            if !args.json {
                info!("✓ {} (seed={}) PASSED", scenario, report.seed);
            }
        } else {
            failed_count += 1;
            if !args.json {
                error!("✗ {} (seed={}) FAILED: {}", scenario, report.seed, violations[0]);
            }
        }
    }

    let total = reports.len();
    if args.json {
        let summary = serde_json::json!({
            "scenario": scenario.name(),
            "base_seed": base_seed,
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": reports.iter().map(|r| {
                let export = RunExport::from_report(scenario.name(), r);
                summary_json(r, &export)
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if failed_count == 0 {
        info!("✅ All {} seeds passed!", total);
    } else {
        error!("❌ {}/{} seeds failed!", failed_count, total);
    }

    Ok(failed_count == 0)
}

fn summary_json(report: &RunReport, export: &RunExport) -> serde_json::Value {
    serde_json::json!({
        "seed": report.seed,
        "run_id": export.run_id,
        "steps": report.steps,
        "final": report.final_metrics(),
        "births": report.ledger.count_kind(EventKind::Birth),
        "collapses": report.ledger.count_kind(EventKind::Collapse),
        "allowed": export.ledger.allowed,
        "births_skipped": report.births_skipped,
        "passed": export.passed,
        "violations": export.violations,
    })
}
