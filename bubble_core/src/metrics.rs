//! Population metrics, recomputed from scratch every step.

use crate::arena::BubbleArena;
use serde::{Deserialize, Serialize};

/// Per-step aggregate emitted by the engine.
///
/// Serialized field names match the metrics CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Step index (0 = seed population)
    pub t: u64,

    /// Bubbles ever created
    pub universes_total: usize,

    /// Bubbles currently live
    pub universes_stable: usize,

    /// Stability ratio: stable / total, 0 when total is 0
    #[serde(rename = "RCI")]
    pub rci: f64,

    /// Running sum of granted exports
    #[serde(rename = "Δℰ")]
    pub cumulative_export: f64,

    /// Mean inflation over live bubbles (0 with none live)
    pub mean_inflation: f64,

    /// Mean invariants over live bubbles (0 with none live)
    pub mean_invariants: f64,
}

impl RunMetrics {
    /// Aggregates the arena state at step `t`.
    pub fn collect(t: u64, arena: &BubbleArena, cumulative_export: f64) -> Self {
        let total = arena.total();

        let mut stable = 0usize;
        let mut inflation_sum = 0.0;
        let mut invariants_sum = 0.0;
        for bubble in arena.iter_live() {
            stable += 1;
            inflation_sum += bubble.inflation;
            invariants_sum += bubble.invariants();
        }

        let (mean_inflation, mean_invariants) = if stable > 0 {
            (inflation_sum / stable as f64, invariants_sum / stable as f64)
        } else {
            (0.0, 0.0)
        };

        Self {
            t,
            universes_total: total,
            universes_stable: stable,
            rci: stability_ratio(stable, total),
            cumulative_export,
            mean_inflation,
            mean_invariants,
        }
    }
}

/// Live fraction of all bubbles ever created.
pub fn stability_ratio(stable: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        stable as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_arena() {
        let metrics = RunMetrics::collect(0, &BubbleArena::new(), 0.0);

        assert_eq!(metrics.universes_total, 0);
        assert_eq!(metrics.universes_stable, 0);
        assert_eq!(metrics.rci, 0.0);
        assert_eq!(metrics.mean_inflation, 0.0);
        assert_eq!(metrics.mean_invariants, 0.0);
    }

    #[test]
    fn test_means_skip_collapsed() {
        let mut arena = BubbleArena::new();
        let a = arena.spawn(1.0, true, None);
        let b = arena.spawn(3.0, true, None);
        let c = arena.spawn(100.0, true, None);
        arena.get_mut(a).unwrap().credit(0.2);
        arena.get_mut(b).unwrap().credit(0.4);
        arena.get_mut(c).unwrap().credit(50.0);
        arena.collapse(c);

        let metrics = RunMetrics::collect(5, &arena, 1.5);

        assert_eq!(metrics.t, 5);
        assert_eq!(metrics.universes_total, 3);
        assert_eq!(metrics.universes_stable, 2);
        assert_relative_eq!(metrics.rci, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.mean_inflation, 2.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.mean_invariants, 0.3, epsilon = 1e-12);
        assert_eq!(metrics.cumulative_export, 1.5);
    }

    #[test]
    fn test_all_collapsed() {
        let mut arena = BubbleArena::new();
        let a = arena.spawn(1.0, true, None);
        arena.collapse(a);

        let metrics = RunMetrics::collect(1, &arena, 0.0);
        assert_eq!(metrics.rci, 0.0);
        assert_eq!(metrics.universes_total, 1);
        assert_eq!(metrics.mean_inflation, 0.0);
    }

    #[test]
    fn test_stability_ratio_bounds() {
        assert_eq!(stability_ratio(0, 0), 0.0);
        assert_eq!(stability_ratio(4, 4), 1.0);
        assert_eq!(stability_ratio(1, 4), 0.25);
    }
}
