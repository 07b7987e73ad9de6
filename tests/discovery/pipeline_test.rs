//! End-to-end discovery against in-memory SQLite databases.

use keyscout::discovery::{
    DiscoveryConfig, DiscoveryPipeline, KeyClassification, KeyClassifier, MatchOrigin,
    OfflineRater, UntrackedReason,
};
use keyscout::prelude::*;
use keyscout::report::{status, FieldRole};

fn shop() -> SqliteSource {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE users (id INTEGER, name TEXT);
             INSERT INTO users VALUES (1, 'ada'), (2, 'bob'), (3, 'cy');
             CREATE TABLE orders (order_id INTEGER, user_id INTEGER, total REAL);
             INSERT INTO orders VALUES (100, 1, 9.5), (205, 1, 3.0), (310, 2, 7.25), (415, NULL, 1.0);",
        )
        .unwrap();
    source
}

#[tokio::test]
async fn test_users_orders_relationship() {
    let source = shop();
    let outcome = DiscoveryPipeline::new(&source, &OfflineRater, DiscoveryConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.pk_candidates, vec![ColumnRef::new("users", "id")]);
    assert_eq!(
        outcome.fk_candidates,
        vec![
            ColumnRef::new("orders", "order_id"),
            ColumnRef::new("orders", "user_id"),
        ]
    );
    assert_eq!(outcome.untracked_tables, vec!["orders".to_string()]);

    let verified: Vec<_> = outcome.verified().collect();
    assert_eq!(verified.len(), 1);
    let (m, stats) = verified[0];
    assert_eq!(m.to_string(), "users.id -> orders.user_id");
    assert_eq!(m.origin, MatchOrigin::Naming);
    assert_eq!(stats.distinct_fk, 2);
    assert_eq!(stats.distinct_pk, 3);
    assert_eq!(stats.null_percentage, 25.0);
    assert!((stats.coverage_percent - 66.666).abs() < 0.01);
}

#[tokio::test]
async fn test_report_rows_for_shop() {
    let source = shop();
    let outcome = DiscoveryPipeline::new(&source, &OfflineRater, DiscoveryConfig::default())
        .run()
        .await
        .unwrap();
    let report = Report::assemble(&outcome);

    let rows: Vec<(&str, &str, Option<FieldRole>, &str, &str)> = report
        .rows
        .iter()
        .map(|r| {
            (
                r.table_name.as_str(),
                r.field_name.as_str(),
                r.field_type,
                r.relationship.as_str(),
                r.status.as_str(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("users", "id", Some(FieldRole::Pk), "→ orders.user_id", status::VERIFIED),
            ("orders", "user_id", Some(FieldRole::Fk), "← users.id", status::VERIFIED),
            ("orders", "order_id", Some(FieldRole::Fk), "No relationships", status::UNUSED_FK),
        ]
    );
}

#[tokio::test]
async fn test_declared_sequential_key_is_sole_candidate() {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE products (product_id INTEGER PRIMARY KEY, sku_id INTEGER);
             INSERT INTO products VALUES (1, 1), (2, 2), (3, 3);",
        )
        .unwrap();

    let classifier = KeyClassifier::new(&source);
    assert_eq!(
        classifier.classify("products").await.unwrap(),
        KeyClassification::Declared(vec!["product_id".into()])
    );

    let candidates = classifier.discover().await.unwrap();
    assert_eq!(
        candidates.pk_candidates,
        vec![ColumnRef::new("products", "product_id")]
    );
    assert_eq!(
        candidates.fk_candidates,
        vec![ColumnRef::new("products", "sku_id")]
    );
}

#[tokio::test]
async fn test_rejected_declared_key_untracks_table() {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE events (code INTEGER PRIMARY KEY, event_id INTEGER);
             INSERT INTO events VALUES (10, 1), (20, 2), (30, 3);",
        )
        .unwrap();

    let classification = KeyClassifier::new(&source).classify("events").await.unwrap();
    assert_eq!(
        classification,
        KeyClassification::Untracked(UntrackedReason::DeclaredKeyRejected)
    );
}

#[tokio::test]
async fn test_empty_database() {
    let source = SqliteSource::open_in_memory().unwrap();
    let outcome = DiscoveryPipeline::new(&source, &OfflineRater, DiscoveryConfig::default())
        .run()
        .await
        .unwrap();
    assert_eq!(outcome, DiscoveryOutcome::default());
    assert!(Report::assemble(&outcome).rows.is_empty());
}
