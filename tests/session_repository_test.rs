//! Integration tests for session persistence across the three session kinds,
//! including cascade deletion and the non-adaptive result computations.

mod common;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use larkspur::domain::errors::DomainError;
use larkspur::domain::models::{SessionKind, LABEL_FIRST};
use larkspur::services::session_service::SessionElements;

use common::{new_session, seed_dataset, setup};

#[tokio::test]
async fn test_create_and_get_session() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 3).await;
    let mut rng = StdRng::seed_from_u64(11);

    let created = service
        .create_session(new_session(dataset_id, SessionKind::Classification), &slices, None, &mut rng)
        .await
        .expect("create session");

    let fetched = service.get_session(created.id).await.expect("get session");
    assert_eq!(fetched, created);
    assert_eq!(fetched.kind, SessionKind::Classification);

    let listed = service.list_sessions(dataset_id).await.expect("list sessions");
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn test_get_missing_session_fails() {
    let (_pool, service) = setup().await;
    let err = service.get_session(999).await.expect_err("no such session");
    assert!(matches!(err, DomainError::SessionNotFound(999)));
}

#[tokio::test]
async fn test_classification_session_has_slice_elements_only() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 4).await;
    let mut rng = StdRng::seed_from_u64(11);

    let session = service
        .create_session(new_session(dataset_id, SessionKind::Classification), &slices, None, &mut rng)
        .await
        .expect("create session");

    match service.select_elements_to_label(&session).await.expect("elements") {
        SessionElements::Slices(elements) => {
            assert_eq!(elements.len(), 4);
            let indices: Vec<i64> = elements.iter().map(|s| s.element_index).collect();
            assert_eq!(indices, vec![0, 1, 2, 3]);
            let refs: Vec<_> = elements.iter().map(|s| s.slice).collect();
            assert_eq!(refs, slices);
        }
        SessionElements::Comparisons(_) => panic!("expected slice elements"),
    }
}

#[tokio::test]
async fn test_random_comparison_session_samples_pairs_up_front() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 4).await;
    let mut rng = StdRng::seed_from_u64(11);

    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonRandom),
            &slices,
            Some(3),
            &mut rng,
        )
        .await
        .expect("create session");

    let SessionElements::Comparisons(comparisons) =
        service.select_elements_to_label(&session).await.expect("elements")
    else {
        panic!("expected comparison elements");
    };
    assert_eq!(comparisons.len(), 3);
    for comparison in &comparisons {
        assert_ne!(comparison.left, comparison.right);
        assert!(slices.contains(&comparison.left));
        assert!(slices.contains(&comparison.right));
    }
}

#[tokio::test]
async fn test_random_comparison_results_rank_by_wins() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 3).await;
    let mut rng = StdRng::seed_from_u64(11);

    // All three pairs.
    let session = service
        .create_session(
            new_session(dataset_id, SessionKind::ComparisonRandom),
            &slices,
            None,
            &mut rng,
        )
        .await
        .expect("create session");

    let SessionElements::Comparisons(comparisons) =
        service.select_elements_to_label(&session).await.expect("elements")
    else {
        panic!("expected comparison elements");
    };
    assert_eq!(comparisons.len(), 3);

    let results = service.compute_results(&session).await.expect("results");
    assert!(!results.labeling_complete);

    // Judge every pair in favor of its first slice.
    for comparison in &comparisons {
        let now = Utc::now();
        service
            .add_label(&session, comparison.id, LABEL_FIRST, now, now)
            .await
            .expect("add label");
    }

    let results = service.compute_results(&session).await.expect("results");
    assert!(results.labeling_complete);
    assert_eq!(results.slice_results.len(), 3);
    // Win counts are strictly decreasing when every pair went to its first
    // slice and sampling order breaks ties.
    let wins: Vec<usize> = results
        .slice_results
        .iter()
        .map(|r| r.latest_label.as_deref().unwrap_or("0").parse().unwrap())
        .collect();
    assert!(wins.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(wins.iter().sum::<usize>(), 3);
}

#[tokio::test]
async fn test_classification_results_group_by_label_option() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 3).await;
    let mut rng = StdRng::seed_from_u64(11);

    let mut attrs = new_session(dataset_id, SessionKind::Classification);
    attrs.label_options = "Normal,Abnormal".to_string();
    let session = service
        .create_session(attrs, &slices, None, &mut rng)
        .await
        .expect("create session");

    let SessionElements::Slices(elements) =
        service.select_elements_to_label(&session).await.expect("elements")
    else {
        panic!("expected slice elements");
    };

    let now = Utc::now();
    service.add_label(&session, elements[0].id, "Abnormal", now, now).await.expect("label");
    service.add_label(&session, elements[2].id, "Normal", now, now).await.expect("label");

    let results = service.compute_results(&session).await.expect("results");
    assert!(!results.labeling_complete);
    let labels: Vec<Option<&str>> =
        results.slice_results.iter().map(|r| r.latest_label.as_deref()).collect();
    // Grouped in option order, unlabeled slices last.
    assert_eq!(labels, vec![Some("Normal"), Some("Abnormal"), None]);
}

#[tokio::test]
async fn test_delete_session_cascades_elements_and_labels() {
    let (pool, service) = setup().await;
    let (dataset_id, slices) = seed_dataset(&pool, 3).await;
    let mut rng = StdRng::seed_from_u64(11);

    let session = service
        .create_session(new_session(dataset_id, SessionKind::Classification), &slices, None, &mut rng)
        .await
        .expect("create session");

    let SessionElements::Slices(elements) =
        service.select_elements_to_label(&session).await.expect("elements")
    else {
        panic!("expected slice elements");
    };
    let now = Utc::now();
    service.add_label(&session, elements[0].id, "Normal", now, now).await.expect("label");

    service.delete_session(session.id).await.expect("delete");

    let err = service.get_session(session.id).await.expect_err("deleted");
    assert!(matches!(err, DomainError::SessionNotFound(_)));

    let element_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session_elements")
        .fetch_one(&pool)
        .await
        .expect("count elements");
    assert_eq!(element_count, 0);
    let label_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM element_labels")
        .fetch_one(&pool)
        .await
        .expect("count labels");
    assert_eq!(label_count, 0);
}

#[tokio::test]
async fn test_delete_missing_session_fails() {
    let (_pool, service) = setup().await;
    let err = service.delete_session(42).await.expect_err("no such session");
    assert!(matches!(err, DomainError::SessionNotFound(42)));
}
