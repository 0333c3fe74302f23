//! Session service: the capability surface consumed by UI layers, plus the
//! active-session controller for comparison/active-sort sessions.
//!
//! The controller deliberately holds no ranking state. Every labeling action
//! re-derives the sort matrix and the next-comparison decision from the
//! persisted judgment history, then commits its effects through the element
//! repository's single transactional entry point. Caching the matrix across
//! calls would reintroduce the dual-state bugs this design exists to avoid.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    label_to_edge, Comparison, Label, LabelingSession, SessionKind, Slice, SliceRef,
};
use crate::domain::ports::{ElementRepository, NewSession, SessionRepository};
use crate::services::sampling::sample_comparisons;
use crate::services::sort::{build_matrix, initial_comparison, sort_slices, SortOutcome};

/// The elements a rater works through, by session kind.
#[derive(Debug, Clone)]
pub enum SessionElements {
    Slices(Vec<Slice>),
    Comparisons(Vec<Comparison>),
}

/// One slice in a session's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceResult {
    pub slice: Slice,
    pub latest_label: Option<String>,
}

/// Results of a session, complete or in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResults {
    pub labeling_complete: bool,
    pub slice_results: Vec<SliceResult>,
}

/// Service exposing the uniform session capability surface.
pub struct SessionService<S: SessionRepository, E: ElementRepository> {
    sessions: Arc<S>,
    elements: Arc<E>,
}

impl<S: SessionRepository, E: ElementRepository> SessionService<S, E> {
    pub fn new(sessions: Arc<S>, elements: Arc<E>) -> Self {
        Self { sessions, elements }
    }

    /// Create a session, seeding its elements per kind:
    /// classification sessions get slices only; random-comparison sessions
    /// additionally sample `comparison_count` slice pairs up-front;
    /// active-sort sessions seed exactly one comparison of the first two
    /// slices in sampling order.
    pub async fn create_session<R: Rng>(
        &self,
        attrs: NewSession,
        slices: &[SliceRef],
        comparison_count: Option<usize>,
        rng: &mut R,
    ) -> DomainResult<LabelingSession> {
        if slices.len() < attrs.kind.min_slices() {
            return Err(DomainError::EmptySession {
                kind: attrs.kind.as_str().to_string(),
                needed: attrs.kind.min_slices(),
                got: slices.len(),
            });
        }

        let comparisons: Vec<(SliceRef, SliceRef)> = match attrs.kind {
            SessionKind::Classification => vec![],
            SessionKind::ComparisonRandom => sample_comparisons(slices.len(), comparison_count, rng)?
                .into_iter()
                .map(|(i, j)| (slices[i], slices[j]))
                .collect(),
            SessionKind::ComparisonActiveSort => vec![initial_comparison(slices)?],
        };

        let session = self.sessions.create(attrs, slices, &comparisons).await?;
        info!(
            session_id = session.id,
            kind = session.kind.as_str(),
            slices = slices.len(),
            comparisons = comparisons.len(),
            "created labeling session"
        );
        Ok(session)
    }

    pub async fn get_session(&self, id: i64) -> DomainResult<LabelingSession> {
        self.sessions.get(id).await?.ok_or(DomainError::SessionNotFound(id))
    }

    pub async fn list_sessions(&self, dataset_id: i64) -> DomainResult<Vec<LabelingSession>> {
        self.sessions.list_for_dataset(dataset_id).await
    }

    pub async fn delete_session(&self, id: i64) -> DomainResult<()> {
        self.sessions.delete(id).await
    }

    /// The elements a rater labels for this session, in index order.
    pub async fn select_elements_to_label(
        &self,
        session: &LabelingSession,
    ) -> DomainResult<SessionElements> {
        if session.kind.is_comparison() {
            Ok(SessionElements::Comparisons(self.elements.session_comparisons(session.id).await?))
        } else {
            Ok(SessionElements::Slices(self.elements.session_slices(session.id).await?))
        }
    }

    /// True iff relabeling the comparison at `index` would discard judged
    /// elements after it. Reads current persisted state on every call: the
    /// active-sort frontier can move between queries.
    pub async fn should_warn_about_label_overwrite(
        &self,
        session: &LabelingSession,
        index: i64,
    ) -> DomainResult<bool> {
        if !session.kind.is_active() {
            return Ok(false);
        }
        let labels = self.comparison_labels(session.id).await?;
        Ok(labels
            .iter()
            .enumerate()
            .any(|(i, label)| i as i64 > index && label.is_some()))
    }

    /// Record a label for an element.
    ///
    /// Only active-sort sessions route through the ranking engine; other
    /// kinds append the label to the element's history and are done.
    pub async fn add_label(
        &self,
        session: &LabelingSession,
        element_id: i64,
        value: &str,
        start_at: chrono::DateTime<chrono::Utc>,
        finish_at: chrono::DateTime<chrono::Utc>,
    ) -> DomainResult<()> {
        if session.kind.is_active() {
            self.apply_active_label(session, element_id, value, start_at, finish_at).await
        } else {
            self.elements.insert_label(element_id, value, start_at, finish_at).await?;
            debug!(session_id = session.id, element_id, value, "recorded label");
            Ok(())
        }
    }

    /// The active-sort relabel protocol:
    ///
    /// 1. load the comparison sequence and current labels,
    /// 2. supersede the target element's label with `value`,
    /// 3. drop everything downstream of the target from the working state,
    /// 4. rebuild the sort matrix and re-run the ranking engine,
    /// 5. persist the label, the truncation, and the next comparison (if
    ///    ranking is incomplete) as one transaction.
    async fn apply_active_label(
        &self,
        session: &LabelingSession,
        element_id: i64,
        value: &str,
        start_at: chrono::DateTime<chrono::Utc>,
        finish_at: chrono::DateTime<chrono::Utc>,
    ) -> DomainResult<()> {
        let mut comparisons = self.elements.session_comparisons(session.id).await?;
        let mut labels = self.dense_labels(session.id, &comparisons).await?;

        let Some(position) = comparisons.iter().position(|c| c.id == element_id) else {
            return Err(DomainError::InvalidElementReference {
                session_id: session.id,
                element_id,
            });
        };
        let element_index = comparisons[position].element_index;

        comparisons.truncate(position + 1);
        labels.truncate(position + 1);
        labels[position] = Some(value.to_string());

        let slices = self.elements.session_slices(session.id).await?;
        let slice_refs: Vec<SliceRef> = slices.iter().map(|s| s.slice).collect();

        let matrix = build_matrix(&comparisons, &labels)?;
        let next = match sort_slices(&matrix, &slice_refs) {
            SortOutcome::Ranked(order) => {
                info!(session_id = session.id, slices = order.len(), "ranking complete");
                None
            }
            SortOutcome::NextComparison(left, right) => Some((left, right)),
        };

        self.elements
            .apply_active_label(session.id, element_id, element_index, value, start_at, finish_at, next)
            .await?;

        debug!(
            session_id = session.id,
            element_index,
            value,
            reseeded = next.is_some(),
            "applied active-sort label"
        );
        Ok(())
    }

    /// The single unjudged comparison, if any.
    pub async fn frontier(&self, session: &LabelingSession) -> DomainResult<Option<Comparison>> {
        let comparisons = self.elements.session_comparisons(session.id).await?;
        let current = self.elements.current_labels(session.id).await?;
        Ok(comparisons.into_iter().find(|c| !current.contains_key(&c.id)))
    }

    /// Full label history for one element, oldest first.
    pub async fn label_history(&self, element_id: i64) -> DomainResult<Vec<Label>> {
        self.elements.element_labels(element_id).await
    }

    /// Compute the session's results from its current persisted state.
    pub async fn compute_results(&self, session: &LabelingSession) -> DomainResult<SessionResults> {
        match session.kind {
            SessionKind::Classification => self.classification_results(session).await,
            SessionKind::ComparisonRandom => self.random_comparison_results(session).await,
            SessionKind::ComparisonActiveSort => self.active_sort_results(session).await,
        }
    }

    async fn classification_results(
        &self,
        session: &LabelingSession,
    ) -> DomainResult<SessionResults> {
        let slices = self.elements.session_slices(session.id).await?;
        let current = self.elements.current_labels(session.id).await?;
        let options = session.label_option_list();

        let mut results: Vec<SliceResult> = slices
            .into_iter()
            .map(|slice| {
                let latest_label = current.get(&slice.id).map(|l| l.value.clone());
                SliceResult { slice, latest_label }
            })
            .collect();

        // Group by label option order, unlabeled slices last, stable within
        // a group by element index.
        results.sort_by_key(|r| {
            let group = r
                .latest_label
                .as_ref()
                .and_then(|v| options.iter().position(|o| o == v))
                .unwrap_or(usize::MAX);
            (r.latest_label.is_none(), group, r.slice.element_index)
        });

        let labeling_complete = results.iter().all(|r| r.latest_label.is_some());
        Ok(SessionResults { labeling_complete, slice_results: results })
    }

    async fn random_comparison_results(
        &self,
        session: &LabelingSession,
    ) -> DomainResult<SessionResults> {
        let slices = self.elements.session_slices(session.id).await?;
        let comparisons = self.elements.session_comparisons(session.id).await?;
        let current = self.elements.current_labels(session.id).await?;

        let mut wins: HashMap<SliceRef, usize> = HashMap::new();
        let mut judged = 0usize;
        for comparison in &comparisons {
            if let Some(label) = current.get(&comparison.id) {
                judged += 1;
                if let Some((winner, _)) = label_to_edge(comparison, &label.value) {
                    *wins.entry(winner).or_insert(0) += 1;
                }
            }
        }

        // Rank by win count, ties by sampling order.
        let mut ranked: Vec<(usize, Slice)> = slices
            .into_iter()
            .map(|slice| (wins.get(&slice.slice).copied().unwrap_or(0), slice))
            .collect();
        ranked.sort_by_key(|(count, slice)| (std::cmp::Reverse(*count), slice.element_index));

        Ok(SessionResults {
            labeling_complete: judged == comparisons.len(),
            slice_results: ranked
                .into_iter()
                .map(|(count, slice)| SliceResult { slice, latest_label: Some(count.to_string()) })
                .collect(),
        })
    }

    async fn active_sort_results(
        &self,
        session: &LabelingSession,
    ) -> DomainResult<SessionResults> {
        let slices = self.elements.session_slices(session.id).await?;
        let comparisons = self.elements.session_comparisons(session.id).await?;
        let labels = self.dense_labels(session.id, &comparisons).await?;

        let slice_refs: Vec<SliceRef> = slices.iter().map(|s| s.slice).collect();
        let matrix = build_matrix(&comparisons, &labels)?;

        match sort_slices(&matrix, &slice_refs) {
            SortOutcome::Ranked(order) => {
                let mut by_ref: HashMap<SliceRef, Slice> =
                    slices.into_iter().map(|s| (s.slice, s)).collect();
                let slice_results = order
                    .into_iter()
                    .filter_map(|r| by_ref.remove(&r))
                    .map(|slice| SliceResult { slice, latest_label: None })
                    .collect();
                Ok(SessionResults { labeling_complete: true, slice_results })
            }
            SortOutcome::NextComparison(..) => Ok(SessionResults {
                labeling_complete: false,
                slice_results: slices
                    .into_iter()
                    .map(|slice| SliceResult { slice, latest_label: None })
                    .collect(),
            }),
        }
    }

    /// Current comparison label values as a dense vector parallel to the
    /// comparison sequence by element index.
    async fn dense_labels(
        &self,
        session_id: i64,
        comparisons: &[Comparison],
    ) -> DomainResult<Vec<Option<String>>> {
        let current = self.elements.current_labels(session_id).await?;
        Ok(comparisons
            .iter()
            .map(|c| current.get(&c.id).map(|l| l.value.clone()))
            .collect())
    }

    async fn comparison_labels(&self, session_id: i64) -> DomainResult<Vec<Option<String>>> {
        let comparisons = self.elements.session_comparisons(session_id).await?;
        self.dense_labels(session_id, &comparisons).await
    }
}
