//! Append-only store of every bubble created during a run.

use crate::bubble::{Bubble, BubbleId};
use std::ops::{Index, IndexMut};

/// Arena owning all bubbles, live and collapsed.
///
/// Bubbles are never removed: ids are indices, parent links are index
/// lookups, and `total()` only grows while `live()` can shrink.
#[derive(Debug, Clone, Default)]
pub struct BubbleArena {
    /// All bubbles in creation order
    bubbles: Vec<Bubble>,

    /// Number of bubbles not yet collapsed
    live: usize,
}

impl BubbleArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new live bubble and returns its id.
    pub fn spawn(&mut self, inflation: f64, consent: bool, parent_id: Option<BubbleId>) -> BubbleId {
        let id = BubbleId(self.bubbles.len() as u64);
        self.bubbles.push(Bubble::new(id, inflation, consent, parent_id));
        self.live += 1;
        id
    }

    /// Returns a bubble by id.
    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.get(id.index())
    }

    /// Returns a mutable bubble by id.
    pub fn get_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.get_mut(id.index())
    }

    /// Returns two distinct bubbles mutably (parent and child on birth).
    ///
    /// # Panics
    /// Panics if `a == b` or either id is out of range.
    pub fn pair_mut(&mut self, a: BubbleId, b: BubbleId) -> (&mut Bubble, &mut Bubble) {
        assert_ne!(a, b, "pair_mut on the same bubble");
        let (lo, hi, swapped) = if a < b { (a, b, false) } else { (b, a, true) };
        let (head, tail) = self.bubbles.split_at_mut(hi.index());
        let (first, second) = (&mut head[lo.index()], &mut tail[0]);
        if swapped {
            (second, first)
        } else {
            (first, second)
        }
    }

    /// Marks a bubble collapsed and removes it from live iteration.
    pub fn collapse(&mut self, id: BubbleId) {
        let bubble = &mut self.bubbles[id.index()];
        bubble.collapse();
        self.live -= 1;
    }

    /// Total bubbles ever created.
    pub fn total(&self) -> usize {
        self.bubbles.len()
    }

    /// Bubbles currently live.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Iterates over every bubble in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    /// Iterates over live bubbles in creation order.
    pub fn iter_live(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter().filter(|b| b.is_alive())
    }

    /// Ids of live bubbles among the first `prefix` created.
    ///
    /// A step snapshots its population this way so newborns wait a step.
    pub fn live_ids_before(&self, prefix: usize) -> Vec<BubbleId> {
        self.bubbles[..prefix.min(self.bubbles.len())]
            .iter()
            .filter(|b| b.is_alive())
            .map(|b| b.id)
            .collect()
    }

    /// Walks the lineage of a bubble up to its root, starting with its parent.
    pub fn ancestors(&self, id: BubbleId) -> impl Iterator<Item = &Bubble> {
        let mut next = self.get(id).and_then(|b| b.parent_id);
        std::iter::from_fn(move || {
            let bubble = self.get(next?)?;
            next = bubble.parent_id;
            Some(bubble)
        })
    }
}

impl Index<BubbleId> for BubbleArena {
    type Output = Bubble;

    fn index(&self, id: BubbleId) -> &Bubble {
        &self.bubbles[id.index()]
    }
}

impl IndexMut<BubbleId> for BubbleArena {
    fn index_mut(&mut self, id: BubbleId) -> &mut Bubble {
        &mut self.bubbles[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_sequential_ids() {
        let mut arena = BubbleArena::new();
        let a = arena.spawn(1.0, true, None);
        let b = arena.spawn(1.1, false, Some(a));

        assert_eq!(a, BubbleId(0));
        assert_eq!(b, BubbleId(1));
        assert_eq!(arena.total(), 2);
        assert_eq!(arena.live(), 2);
        assert_eq!(arena.get(b).unwrap().parent_id, Some(a));
    }

    #[test]
    fn test_collapse_keeps_history() {
        let mut arena = BubbleArena::new();
        let a = arena.spawn(1.0, true, None);
        let b = arena.spawn(1.0, true, Some(a));
        arena.collapse(a);

        assert_eq!(arena.total(), 2);
        assert_eq!(arena.live(), 1);
        assert!(!arena.get(a).unwrap().is_alive());

        let live: Vec<BubbleId> = arena.iter_live().map(|b| b.id).collect();
        assert_eq!(live, vec![b]);

        // Collapsed parents stay reachable from live children
        assert_eq!(arena.ancestors(b).next().map(|p| p.id), Some(a));
    }

    #[test]
    fn test_live_ids_before_excludes_newborns() {
        let mut arena = BubbleArena::new();
        let a = arena.spawn(1.0, true, None);
        let snapshot = arena.total();
        arena.spawn(1.0, true, Some(a));

        assert_eq!(arena.live_ids_before(snapshot), vec![a]);
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut arena = BubbleArena::new();
        let a = arena.spawn(1.0, true, None);
        let b = arena.spawn(2.0, true, Some(a));

        let (child, parent) = arena.pair_mut(b, a);
        assert_eq!(child.id, b);
        assert_eq!(parent.id, a);
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let mut arena = BubbleArena::new();
        let root = arena.spawn(1.0, true, None);
        let mid = arena.spawn(1.0, true, Some(root));
        let leaf = arena.spawn(1.0, true, Some(mid));

        let lineage: Vec<BubbleId> = arena.ancestors(leaf).map(|b| b.id).collect();
        assert_eq!(lineage, vec![mid, root]);
        assert_eq!(arena.ancestors(root).count(), 0);
    }
}
