//! Exporters for metrics (CSV), the ledger (JSONL) and whole runs (JSON).
//!
//! The JSON run export is the hand-off to external plotting tools.

use crate::error::SimError;
use crate::runner::RunReport;
use bubble_core::{EventKind, ExportEvent, MultiverseConfig, RunMetrics};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// Writes metrics rows as CSV, optionally preceded by the header.
pub fn write_metrics_csv<W: Write>(writer: W, metrics: &[RunMetrics], header: bool) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(header)
        .from_writer(writer);

    for row in metrics {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Appends metrics to a CSV file, writing the header only for a new or
/// empty file.
pub fn append_metrics_csv(path: impl AsRef<Path>, metrics: &[RunMetrics]) -> Result<(), SimError> {
    let path = path.as_ref();
    let need_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_metrics_csv(BufWriter::new(file), metrics, need_header)
}

/// Writes one JSON object per ledger record.
pub fn write_ledger_jsonl<W: Write>(mut writer: W, events: &[ExportEvent]) -> Result<(), SimError> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the ledger to a JSONL file, replacing any previous content.
pub fn dump_ledger(path: impl AsRef<Path>, events: &[ExportEvent]) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_ledger_jsonl(BufWriter::new(file), events)
}

/// Deterministic run identifier derived from the seed.
pub fn run_id(seed: u64) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&seed.to_le_bytes());
    bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
    Uuid::from_bytes(bytes)
}

/// Ledger totals carried in a run export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub records: usize,
    pub allowed: usize,
    pub births: usize,
    pub collapses: usize,
    pub total_granted: f64,
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Identifier derived from the seed
    pub run_id: Uuid,

    /// Steps executed
    pub steps: u64,

    /// Full configuration
    pub config: MultiverseConfig,

    /// Metrics for t = 0..=steps
    pub frames: Vec<RunMetrics>,

    /// Ledger totals
    pub ledger: LedgerSummary,

    /// Births dropped at the population cap
    pub births_skipped: usize,

    /// Audit outcome
    pub passed: bool,

    /// Audit findings, if any
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<String>,
}

impl RunExport {
    /// Builds an export from a finished run.
    pub fn from_report(scenario: &str, report: &RunReport) -> Self {
        let violations: Vec<String> = report.audit().iter().map(|v| v.to_string()).collect();
        let ledger = &report.ledger;

        Self {
            scenario: scenario.to_string(),
            seed: report.seed,
            run_id: run_id(report.seed),
            steps: report.steps,
            config: report.config.clone(),
            frames: report.history.clone(),
            ledger: LedgerSummary {
                records: ledger.len(),
                allowed: ledger.allowed_count(),
                births: ledger.count_kind(EventKind::Birth),
                collapses: ledger.count_kind(EventKind::Collapse),
                total_granted: ledger.total_granted(),
            },
            births_skipped: report.births_skipped,
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::SimRunner;
    use approx::assert_relative_eq;
    use bubble_core::Policy;
    use tempfile::tempdir;

    fn sample_report() -> RunReport {
        let config = MultiverseConfig {
            n_initial: 2,
            policy: Policy::Open,
            tunnel_rate: 0.5,
            decay_rate: 0.3,
            ..Default::default()
        };
        SimRunner::new(config).with_steps(5).run_seeded(Some(4)).unwrap()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_metrics_csv(&mut buf, &report.history, true).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("t,universes_total,universes_stable,RCI,Δℰ,mean_inflation,mean_invariants")
        );
        assert_eq!(lines.count(), 6);
    }

    #[test]
    fn test_csv_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        let report = sample_report();

        append_metrics_csv(&path, &report.history).unwrap();
        append_metrics_csv(&path, &report.history).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("t,")).count(), 1);
        assert_eq!(text.lines().count(), 1 + 2 * report.history.len());
    }

    #[test]
    fn test_ledger_jsonl_one_record_per_line() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_ledger_jsonl(&mut buf, report.ledger.events()).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), report.ledger.len());
        for (line, event) in text.lines().zip(report.ledger.events()) {
            let parsed: ExportEvent = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.t, event.t);
            assert_eq!(parsed.kind, event.kind);
            assert_eq!(parsed.src, event.src);
            assert_eq!(parsed.dst, event.dst);
            assert_eq!(parsed.allowed, event.allowed);
            assert_eq!(parsed.reason, event.reason);
            assert_relative_eq!(parsed.granted, event.granted, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_run_export_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        let report = sample_report();

        let export = RunExport::from_report("open_frontier", &report);
        export.write_to_file(&path).unwrap();

        let loaded: RunExport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.scenario, "open_frontier");
        assert_eq!(loaded.seed, 4);
        assert_eq!(loaded.run_id, run_id(4));
        assert_eq!(loaded.frames.len(), 6);
        assert_eq!(loaded.ledger.records, export.ledger.records);
        assert_eq!(loaded.ledger.births, export.ledger.births);
        assert_relative_eq!(loaded.ledger.total_granted, export.ledger.total_granted, epsilon = 1e-12);
        assert!(loaded.passed);
    }

    #[test]
    fn test_run_id_deterministic() {
        assert_eq!(run_id(42), run_id(42));
        assert_ne!(run_id(42), run_id(43));
    }
}
