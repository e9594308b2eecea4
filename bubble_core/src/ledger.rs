//! Append-only audit ledger of attempted exports.

use crate::bubble::BubbleId;
use crate::ethics::{ExportDecision, Policy, Reason};
use serde::{Deserialize, Serialize};

/// Kind of event that triggered an export attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Transfer from parent to a newborn child
    Birth,

    /// Transfer from a collapsing bubble to the outside
    Collapse,
}

/// One attempted export, allowed or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEvent {
    /// Step index
    pub t: u64,

    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Source bubble
    pub src: BubbleId,

    /// Child bubble (births only)
    pub dst: Option<BubbleId>,

    /// Proposed amount, already clamped to the source's invariants
    pub proposed: f64,

    pub allowed: bool,

    /// Granted amount; 0 when refused
    #[serde(rename = "amount")]
    pub granted: f64,

    pub policy: Policy,

    pub src_consents: bool,

    /// Child consent (births only)
    pub dst_consents: Option<bool>,

    pub reason: Reason,
}

impl ExportEvent {
    /// Builds a ledger record from an evaluated export.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t: u64,
        kind: EventKind,
        src: BubbleId,
        dst: Option<BubbleId>,
        proposed: f64,
        policy: Policy,
        src_consents: bool,
        dst_consents: Option<bool>,
        decision: ExportDecision,
    ) -> Self {
        Self {
            t,
            kind,
            src,
            dst,
            proposed,
            allowed: decision.allowed,
            granted: if decision.allowed { decision.granted } else { 0.0 },
            policy,
            src_consents,
            dst_consents,
            reason: decision.reason,
        }
    }
}

/// Ordered sequence of export events for a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    events: Vec<ExportEvent>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its index.
    pub fn record(&mut self, event: ExportEvent) -> usize {
        self.events.push(event);
        self.events.len() - 1
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All records in append order.
    pub fn events(&self) -> &[ExportEvent] {
        &self.events
    }

    /// Number of allowed records.
    pub fn allowed_count(&self) -> usize {
        self.events.iter().filter(|e| e.allowed).count()
    }

    /// Number of records of a kind.
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Sum of granted amounts.
    pub fn total_granted(&self) -> f64 {
        self.events.iter().map(|e| e.granted).sum()
    }
}
