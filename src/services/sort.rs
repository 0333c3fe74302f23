//! Matrix builder and ranking engine for active-sort sessions.
//!
//! Both functions here are pure: they hold no state and perform no I/O, so
//! the full ranking decision can always be re-derived from the persisted
//! judgment history. The engine either produces a total order over the
//! session's slices or the single next pair a rater should judge.
//!
//! Pair selection uses binary insertion: slices are placed one at a time into
//! a provisionally sorted prefix, probing the midpoint of the unresolved
//! range. Probes are answered from the transitive closure of past judgments
//! where possible, so a pair whose relation is already implied is never
//! proposed, and the choice is fully deterministic for a fixed history.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{label_to_edge, Comparison, SliceRef, SortMatrix};

/// Result of running the ranking engine over a session's judgment state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// Every pair is comparable: the full ranking, winners first.
    Ranked(Vec<SliceRef>),
    /// The next pair to present to the rater.
    NextComparison(SliceRef, SliceRef),
}

impl SortOutcome {
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }
}

/// The fixed seed comparison for a new active-sort session: the first two
/// slices in sampling order.
pub fn initial_comparison(slices: &[SliceRef]) -> DomainResult<(SliceRef, SliceRef)> {
    if slices.len() < 2 {
        return Err(DomainError::EmptySession {
            kind: "comparison".to_string(),
            needed: 2,
            got: slices.len(),
        });
    }
    Ok((slices[0], slices[1]))
}

/// Build the sort matrix from a comparison sequence and its current labels.
///
/// `labels` is parallel to `comparisons` by element index. Unjudged elements
/// (expected only for the single frontier element) and non-directional label
/// values contribute no edge. A judgment that contradicts the transitive
/// closure of earlier judgments fails with `InconsistentJudgmentHistory`.
pub fn build_matrix(
    comparisons: &[Comparison],
    labels: &[Option<String>],
) -> DomainResult<SortMatrix> {
    let mut matrix = SortMatrix::new();
    for (comparison, label) in comparisons.iter().zip(labels) {
        let Some(value) = label else { continue };
        if let Some((winner, loser)) = label_to_edge(comparison, value) {
            matrix.add_judgment(winner, loser)?;
        }
    }
    Ok(matrix)
}

/// Rank `slices` against the judged relation in `matrix`.
///
/// Returns the total order (winners first) once every needed relation is
/// known, otherwise the next pair to judge. Fewer than two slices rank
/// trivially with no comparisons.
pub fn sort_slices(matrix: &SortMatrix, slices: &[SliceRef]) -> SortOutcome {
    // Provisionally sorted prefix, winners first.
    let mut sorted: Vec<SliceRef> = Vec::with_capacity(slices.len());

    for &slice in slices {
        let mut lo = 0;
        let mut hi = sorted.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let pivot = sorted[mid];
            if matrix.ranks_above(slice, pivot) {
                hi = mid;
            } else if matrix.ranks_above(pivot, slice) {
                lo = mid + 1;
            } else {
                return SortOutcome::NextComparison(slice, pivot);
            }
        }
        sorted.insert(lo, slice);
    }

    SortOutcome::Ranked(sorted)
}
