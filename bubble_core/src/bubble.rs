//! Bubble universe agents.

use serde::{Deserialize, Serialize};

/// Stable handle of a bubble: its index in the arena.
///
/// Handles are assigned in creation order and never reused, so they double
/// as the monotonically increasing bubble id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BubbleId(pub u64);

impl BubbleId {
    /// Returns the arena slot for this id.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BubbleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One simulated universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    /// Unique, immutable id
    pub id: BubbleId,

    /// Inflation rate; drifts without bounds
    pub inflation: f64,

    /// Exportable invariants, never negative
    invariants: f64,

    /// False once collapsed; collapse is terminal
    alive: bool,

    /// Sovereignty flag, fixed at creation
    pub consent: bool,

    /// Originating bubble (lineage only)
    pub parent_id: Option<BubbleId>,
}

impl Bubble {
    /// Creates a live bubble with no invariants.
    pub fn new(id: BubbleId, inflation: f64, consent: bool, parent_id: Option<BubbleId>) -> Self {
        Self {
            id,
            inflation,
            invariants: 0.0,
            alive: true,
            consent,
            parent_id,
        }
    }

    /// Current invariants.
    pub fn invariants(&self) -> f64 {
        self.invariants
    }

    /// Whether the bubble is still live.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Adds a non-negative amount of invariants.
    pub fn credit(&mut self, amount: f64) {
        assert!(amount >= 0.0, "credit of negative amount {amount} to bubble {}", self.id);
        self.invariants += amount;
    }

    /// Removes invariants, flooring at zero.
    ///
    /// Callers clamp the amount beforehand; the floor only absorbs
    /// floating-point residue.
    pub fn debit(&mut self, amount: f64) {
        assert!(amount >= 0.0, "debit of negative amount {amount} from bubble {}", self.id);
        self.invariants = (self.invariants - amount).max(0.0);
    }

    /// Marks the bubble collapsed.
    ///
    /// # Panics
    /// Panics if the bubble has already collapsed.
    pub(crate) fn collapse(&mut self) {
        assert!(self.alive, "bubble {} collapsed twice", self.id);
        self.alive = false;
    }
}
