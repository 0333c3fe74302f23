//! Element and label repository port.
//!
//! This is the narrow persistence contract the ranking engine operates over.
//! `apply_active_label` is the single transactional entry point of the
//! active-sort relabel protocol; everything else is plain reads and writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Comparison, Label, Slice, SliceRef};

/// Repository interface for session elements and their labels.
#[async_trait]
pub trait ElementRepository: Send + Sync {
    /// A session's slice elements in index order.
    async fn session_slices(&self, session_id: i64) -> DomainResult<Vec<Slice>>;

    /// A session's comparison elements in index order.
    async fn session_comparisons(&self, session_id: i64) -> DomainResult<Vec<Comparison>>;

    /// Append a comparison element at the given index.
    async fn insert_comparison(
        &self,
        session_id: i64,
        element_index: i64,
        left: SliceRef,
        right: SliceRef,
    ) -> DomainResult<i64>;

    /// Delete every comparison element with index strictly greater than
    /// `index`, cascading their label history.
    async fn delete_comparisons_after(&self, session_id: i64, index: i64) -> DomainResult<()>;

    /// Record a label for an element. Labels are append-only; the previous
    /// label is retained as history and merely superseded.
    async fn insert_label(
        &self,
        element_id: i64,
        value: &str,
        start_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
    ) -> DomainResult<i64>;

    /// Full label history for one element, oldest first.
    async fn element_labels(&self, element_id: i64) -> DomainResult<Vec<Label>>;

    /// The current label per element id for a session's elements of one kind.
    /// Current means latest finish time, ties broken by highest label id.
    async fn current_labels(&self, session_id: i64) -> DomainResult<HashMap<i64, Label>>;

    /// The active-sort relabel protocol, committed as one atomic unit:
    ///
    /// 1. record the new label for the element at `element_index`,
    /// 2. delete every comparison with index strictly greater than
    ///    `element_index` (their labels cascade away),
    /// 3. insert `next_comparison` at `element_index + 1`, unjudged, if the
    ///    ranking engine produced one.
    ///
    /// On any failure the transaction rolls back and no partial effect is
    /// observable; the caller may resubmit the same label.
    #[allow(clippy::too_many_arguments)]
    async fn apply_active_label(
        &self,
        session_id: i64,
        element_id: i64,
        element_index: i64,
        value: &str,
        start_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
        next_comparison: Option<(SliceRef, SliceRef)>,
    ) -> DomainResult<()>;
}
