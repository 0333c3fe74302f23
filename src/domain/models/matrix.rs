//! Sort matrix: the pairwise relation derived from judged comparisons.
//!
//! The matrix is never persisted. It is rebuilt from the judgment history on
//! every use, which is what makes retroactive correction safe: truncate the
//! history and the derived relation follows. Edges point winner to loser, and
//! ranking queries consult the transitive closure so the engine never asks a
//! question whose answer is already implied by a chain of judgments.

use std::collections::{HashMap, HashSet};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::element::SliceRef;

/// Directed acyclic relation over a session's slices.
#[derive(Debug, Clone, Default)]
pub struct SortMatrix {
    /// Direct winner -> losers edges from individual judgments.
    edges: HashMap<SliceRef, HashSet<SliceRef>>,
}

impl SortMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct edges recorded.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Record one judgment: `winner` ranks above `loser`.
    ///
    /// Rejects the edge if the closure already implies the opposite order,
    /// which would make the relation cyclic. That condition indicates a
    /// corrupted judgment history and must surface to the operator rather
    /// than being silently resolved.
    pub fn add_judgment(&mut self, winner: SliceRef, loser: SliceRef) -> DomainResult<()> {
        if winner == loser {
            return Err(DomainError::InconsistentJudgmentHistory { left: winner, right: loser });
        }
        if self.ranks_above(loser, winner) {
            return Err(DomainError::InconsistentJudgmentHistory { left: winner, right: loser });
        }
        self.edges.entry(winner).or_default().insert(loser);
        Ok(())
    }

    /// True if `a` is known to rank above `b`, directly or through a chain.
    pub fn ranks_above(&self, a: SliceRef, b: SliceRef) -> bool {
        if a == b {
            return false;
        }

        // Iterative DFS over the winner -> loser edges.
        let mut stack = vec![a];
        let mut visited = HashSet::new();
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if let Some(losers) = self.edges.get(&node) {
                if losers.contains(&b) {
                    return true;
                }
                stack.extend(losers.iter().copied());
            }
        }
        false
    }

    /// True if the relative order of `a` and `b` is known in either direction.
    pub fn comparable(&self, a: SliceRef, b: SliceRef) -> bool {
        self.ranks_above(a, b) || self.ranks_above(b, a)
    }
}
