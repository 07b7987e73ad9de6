//! Referential-integrity verification against live data.

use keyscout::discovery::{CandidateMatch, ColumnRef, RelationshipVerifier, VerificationResult};
use keyscout::source::SqliteSource;

fn source() -> SqliteSource {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE parents (id INTEGER);
             INSERT INTO parents VALUES (1), (2), (3), (4), (5), (6), (7), (8);
             CREATE TABLE children (parent_id INTEGER);
             INSERT INTO children VALUES (1), (2), (2), (3), (4), (9), (NULL);",
        )
        .unwrap();
    source
}

fn candidate() -> CandidateMatch {
    CandidateMatch::new(
        ColumnRef::new("parents", "id"),
        ColumnRef::new("children", "parent_id"),
    )
}

#[tokio::test]
async fn test_one_orphan_in_five_rejected_at_default_threshold() {
    let source = source();
    let result = RelationshipVerifier::new(&source).verify(&candidate()).await;
    assert_eq!(
        result,
        VerificationResult::rejected(
            "Found 1 FK values not present in PK (20.0% of 5 distinct values)"
        )
    );
}

#[tokio::test]
async fn test_one_orphan_in_five_accepted_at_quarter() {
    let source = source();
    let result = RelationshipVerifier::new(&source)
        .with_integrity_threshold(0.25)
        .verify(&candidate())
        .await;
    let stats = result.stats().copied().unwrap();
    assert_eq!(stats.distinct_fk, 5);
    assert_eq!(stats.distinct_pk, 8);
    assert_eq!(stats.coverage_percent, 62.5);
    let expected_nulls = 100.0 / 7.0;
    assert!((stats.null_percentage - expected_nulls).abs() < 1e-9);
}

#[tokio::test]
async fn test_ratio_equal_to_threshold_passes() {
    let source = source();
    let result = RelationshipVerifier::new(&source)
        .with_integrity_threshold(0.2)
        .verify(&candidate())
        .await;
    assert!(result.is_verified());
}

#[tokio::test]
async fn test_all_null_fk_is_vacuously_valid() {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE parents (id INTEGER);
             CREATE TABLE children (parent_id INTEGER);
             INSERT INTO children VALUES (NULL), (NULL);",
        )
        .unwrap();
    let result = RelationshipVerifier::new(&source).verify(&candidate()).await;
    let stats = result.stats().copied().unwrap();
    assert_eq!(stats.null_percentage, 100.0);
    assert_eq!(stats.distinct_pk, 0);
    assert_eq!(stats.coverage_percent, 0.0);
}

#[tokio::test]
async fn test_query_failure_becomes_rejection() {
    let source = source();
    let missing = CandidateMatch::new(
        ColumnRef::new("parents", "id"),
        ColumnRef::new("nowhere", "parent_id"),
    );
    let results = RelationshipVerifier::new(&source)
        .verify_all(&[candidate(), missing])
        .await;
    assert_eq!(results.len(), 2);
    assert!(!results[0].is_verified());
    assert!(results[1]
        .reason()
        .unwrap()
        .starts_with("Error during verification: "));
}
