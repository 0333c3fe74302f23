//! End-to-end tests of comparison/active-sort sessions: adaptive pair
//! proposal, convergence, and the relabel protocol.

mod common;

use std::collections::HashMap;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use larkspur::domain::errors::DomainError;
use larkspur::domain::models::{
    Comparison, LabelingSession, SessionKind, SliceRef, LABEL_FIRST, LABEL_SECOND,
};
use larkspur::services::session_service::SessionElements;

use common::{new_session, seed_dataset, setup, Service};

/// Answer frontier comparisons according to `order` (best first) until the
/// ranking completes. Returns the number of judgments recorded.
async fn run_rater(service: &Service, session: &LabelingSession, order: &[SliceRef]) -> usize {
    let rank: HashMap<SliceRef, usize> =
        order.iter().enumerate().map(|(i, &s)| (s, i)).collect();
    let mut judgments = 0;
    let cap = order.len() * order.len() + 1;

    while let Some(comparison) = service.frontier(session).await.expect("frontier") {
        assert!(judgments < cap, "ranking did not converge within {cap} judgments");
        let value = if rank[&comparison.left] < rank[&comparison.right] {
            LABEL_FIRST
        } else {
            LABEL_SECOND
        };
        let now = Utc::now();
        service
            .add_label(session, comparison.id, value, now, now)
            .await
            .expect("add label");
        judgments += 1;
    }
    judgments
}

async fn ranked_order(service: &Service, session: &LabelingSession) -> (bool, Vec<SliceRef>) {
    let results = service.compute_results(session).await.expect("results");
    let order = results.slice_results.iter().map(|r| r.slice.slice).collect();
    (results.labeling_complete, order)
}

async fn session_comparisons(service: &Service, session: &LabelingSession) -> Vec<Comparison> {
    match service.select_elements_to_label(session).await.expect("elements") {
        SessionElements::Comparisons(comparisons) => comparisons,
        SessionElements::Slices(_) => panic!("expected comparison elements"),
    }
}

#[tokio::test]
async fn test_converges_to_rater_order() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 6).await;
    let mut rng = StdRng::seed_from_u64(7);

    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonActiveSort),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect("create session");

    let judgments = run_rater(&service, &session, &slices).await;
    // 6 items need at most sum of ceil(log2(k)) probes, well under 16.
    assert!(judgments <= 16, "used {judgments} judgments for 6 slices");

    let (complete, order) = ranked_order(&service, &session).await;
    assert!(complete);
    assert_eq!(order, slices);
}

#[tokio::test]
async fn test_two_slice_session_needs_one_judgment() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 2).await;
    let mut rng = StdRng::seed_from_u64(7);

    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonActiveSort),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect("create session");

    // The seed comparison pairs the first two slices.
    let comparisons = session_comparisons(&service, &session).await;
    assert_eq!(comparisons.len(), 1);
    assert_eq!(comparisons[0].left, slices[0]);
    assert_eq!(comparisons[0].right, slices[1]);

    let reversed: Vec<SliceRef> = slices.iter().rev().copied().collect();
    let judgments = run_rater(&service, &session, &reversed).await;
    assert_eq!(judgments, 1);

    let (complete, order) = ranked_order(&service, &session).await;
    assert!(complete);
    assert_eq!(order, reversed);
}

#[tokio::test]
async fn test_create_rejects_too_few_slices() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 1).await;
    let mut rng = StdRng::seed_from_u64(7);

    let err = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonActiveSort),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect_err("one slice cannot be sorted");
    assert!(matches!(err, DomainError::EmptySession { needed: 2, got: 1, .. }));
}

#[tokio::test]
async fn test_relabel_truncates_reseeds_and_reconverges() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 5).await;
    let mut rng = StdRng::seed_from_u64(7);

    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonActiveSort),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect("create session");

    run_rater(&service, &session, &slices).await;
    let (complete, _) = ranked_order(&service, &session).await;
    assert!(complete);

    let before = session_comparisons(&service, &session).await;
    assert!(before.len() >= 3);
    let target = before[1].clone();
    let stale = before.last().cloned().expect("downstream element");

    // Relabeling anything but the frontier discards later judgments.
    assert!(service
        .should_warn_about_label_overwrite(&session, target.element_index)
        .await
        .expect("overwrite check"));

    // Flip the judgment at index 1. With sampling order [a, b, c, d, e] the
    // first probe pairs c against b; "First" now asserts c over b.
    assert_eq!(target.left, slices[2]);
    assert_eq!(target.right, slices[1]);
    let now = Utc::now();
    service
        .add_label(&session, target.id, LABEL_FIRST, now, now)
        .await
        .expect("relabel");

    // Everything after the relabeled element is gone; one fresh comparison
    // is seeded directly after it.
    let after = session_comparisons(&service, &session).await;
    assert_eq!(after.len(), 3);
    assert_eq!(after.last().map(|c| c.element_index), Some(2));
    let frontier = service.frontier(&session).await.expect("frontier");
    assert_eq!(frontier.map(|c| c.element_index), Some(2));

    // Discarded elements cannot be labeled anymore, and the failed attempt
    // leaves no partial state behind.
    let err = service
        .add_label(&session, stale.id, LABEL_FIRST, now, now)
        .await
        .expect_err("stale element reference");
    // The error names the offending element so the rater can tell which
    // judgment was discarded out from under them.
    assert!(matches!(
        err,
        DomainError::InvalidElementReference { session_id, element_id }
            if session_id == session.id && element_id == stale.id
    ));
    assert_eq!(session_comparisons(&service, &session).await.len(), 3);

    // Both judgments of the relabeled element survive as history.
    let history = service.label_history(target.id).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history.last().map(|l| l.value.as_str()), Some(LABEL_FIRST));

    // Finish under the amended preference: c moves ahead of b.
    let amended = vec![slices[0], slices[2], slices[1], slices[3], slices[4]];
    run_rater(&service, &session, &amended).await;
    let (complete, order) = ranked_order(&service, &session).await;
    assert!(complete);
    assert_eq!(order, amended);
}

#[tokio::test]
async fn test_relabel_same_value_reproduces_frontier() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 4).await;
    let mut rng = StdRng::seed_from_u64(7);

    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonActiveSort),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect("create session");

    run_rater(&service, &session, &slices).await;
    let before = session_comparisons(&service, &session).await;
    let target = before[0].clone();
    let history = service.label_history(target.id).await.expect("history");
    let value = history.last().map(|l| l.value.clone()).expect("judged");

    // Re-submitting the same judgment truncates, then re-derives the same
    // next comparison the original run produced.
    let now = Utc::now();
    service
        .add_label(&session, target.id, &value, now, now)
        .await
        .expect("relabel");

    let after = session_comparisons(&service, &session).await;
    assert_eq!(after.len(), 2);
    assert_eq!(after[1].left, before[1].left);
    assert_eq!(after[1].right, before[1].right);

    // The same rater reaches the same ranking again.
    run_rater(&service, &session, &slices).await;
    let (complete, order) = ranked_order(&service, &session).await;
    assert!(complete);
    assert_eq!(order, slices);
}

#[tokio::test]
async fn test_no_overwrite_warning_at_frontier() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 3).await;
    let mut rng = StdRng::seed_from_u64(7);

    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonActiveSort),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect("create session");

    let frontier = service.frontier(&session).await.expect("frontier").expect("seeded");
    assert!(!service
        .should_warn_about_label_overwrite(&session, frontier.element_index)
        .await
        .expect("overwrite check"));
}
