//! Report persistence and reconstruction.

use std::collections::HashSet;

use keyscout::discovery::{DiscoveryConfig, DiscoveryPipeline, OfflineRater};
use keyscout::prelude::*;
use keyscout::report::persist::RELATIONSHIPS_FILE;
use keyscout::report::{FieldRole, ReportRow};

async fn shop_outcome() -> DiscoveryOutcome {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE users (id INTEGER, name TEXT);
             INSERT INTO users VALUES (1, 'ada'), (2, 'bob'), (3, 'cy');
             CREATE TABLE teams (id INTEGER);
             INSERT INTO teams VALUES (1), (2);
             CREATE TABLE orders (order_id INTEGER, user_id INTEGER);
             INSERT INTO orders VALUES (100, 1), (205, 1), (310, 2), (415, NULL);
             CREATE TABLE audit_log (message TEXT);",
        )
        .unwrap();
    DiscoveryPipeline::new(&source, &OfflineRater, DiscoveryConfig::default())
        .run()
        .await
        .unwrap()
}

fn set<T: std::hash::Hash + Eq + Clone>(items: &[T]) -> HashSet<T> {
    items.iter().cloned().collect()
}

fn pairs(outcome: &DiscoveryOutcome) -> HashSet<(ColumnRef, ColumnRef)> {
    outcome
        .verified()
        .map(|(m, _)| (m.pk.clone(), m.fk.clone()))
        .collect()
}

#[tokio::test]
async fn test_reconstruct_matches_outcome() {
    let outcome = shop_outcome().await;
    let rebuilt = Report::assemble(&outcome).reconstruct();

    assert_eq!(set(&rebuilt.pk_candidates), set(&outcome.pk_candidates));
    assert_eq!(set(&rebuilt.fk_candidates), set(&outcome.fk_candidates));
    assert_eq!(set(&rebuilt.untracked_tables), set(&outcome.untracked_tables));
    assert_eq!(pairs(&rebuilt), pairs(&outcome));

    let original: Vec<Stats> = outcome.verified().map(|(_, s)| *s).collect();
    let restored: Vec<Stats> = rebuilt.verified().map(|(_, s)| *s).collect();
    assert_eq!(restored, original);
}

#[tokio::test]
async fn test_untracked_table_gets_its_own_row() {
    let report = Report::assemble(&shop_outcome().await);
    let audit: Vec<&ReportRow> = report
        .rows
        .iter()
        .filter(|r| r.table_name == "audit_log")
        .collect();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].field_name, "");
    assert_eq!(audit[0].field_type, None);
    assert_eq!(audit[0].verified, Some(false));
    assert_eq!(audit[0].status, "no identifiers detected");
}

#[tokio::test]
async fn test_fk_row_mirrors_pk_row() {
    let report = Report::assemble(&shop_outcome().await);
    let pk_row = report
        .rows
        .iter()
        .find(|r| r.field_type == Some(FieldRole::Pk) && r.is_verified())
        .unwrap();
    let fk_row = report
        .rows
        .iter()
        .find(|r| r.field_type == Some(FieldRole::Fk) && r.is_verified())
        .unwrap();
    assert_eq!(pk_row.relationship, "→ orders.user_id");
    assert_eq!(fk_row.relationship, "← users.id");
    assert_eq!(pk_row.distinct_values_source, fk_row.distinct_values_target);
    assert_eq!(pk_row.distinct_values_target, fk_row.distinct_values_source);
    assert_eq!(pk_row.coverage, fk_row.coverage);
}

#[tokio::test]
async fn test_csv_file_roundtrip() {
    let outcome = shop_outcome().await;
    let report = Report::assemble(&outcome);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(RELATIONSHIPS_FILE);
    report.write_csv(&path).unwrap();
    let loaded = Report::read_csv(&path).unwrap();
    assert_eq!(loaded, report);

    let rebuilt = loaded.reconstruct();
    assert_eq!(pairs(&rebuilt), pairs(&outcome));
    assert_eq!(set(&rebuilt.untracked_tables), set(&outcome.untracked_tables));
}
