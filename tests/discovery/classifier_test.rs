//! Key classification edge cases.

use keyscout::discovery::{KeyClassification, KeyClassifier, UntrackedReason};
use keyscout::source::SqliteSource;

fn source(sql: &str) -> SqliteSource {
    let source = SqliteSource::open_in_memory().unwrap();
    source.execute_batch(sql).unwrap();
    source
}

#[tokio::test]
async fn test_single_row_is_not_auto_increment() {
    let source = source("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1);");
    let classifier = KeyClassifier::new(&source);
    assert!(classifier.is_unique("t", "id").await.unwrap());
    assert!(!classifier.is_auto_increment("t", "id").await.unwrap());
    assert_eq!(
        classifier.classify("t").await.unwrap(),
        KeyClassification::Untracked(UntrackedReason::NoIdentifiers)
    );
}

#[tokio::test]
async fn test_empty_table_is_not_auto_increment() {
    let source = source("CREATE TABLE t (id INTEGER);");
    let classifier = KeyClassifier::new(&source);
    assert!(!classifier.is_auto_increment("t", "id").await.unwrap());
}

#[tokio::test]
async fn test_named_id_any_case() {
    let source = source(
        "CREATE TABLE accounts (ID INTEGER, owner_id INTEGER);
         INSERT INTO accounts VALUES (1, 7), (2, 8), (3, 9);",
    );
    assert_eq!(
        KeyClassifier::new(&source).classify("accounts").await.unwrap(),
        KeyClassification::NamedId("ID".into())
    );
}

#[tokio::test]
async fn test_pattern_matched_columns() {
    let source = source(
        "CREATE TABLE ledger (entry_id INTEGER, batch_id INTEGER, note TEXT);
         INSERT INTO ledger VALUES (1, 5, 'a'), (2, 5, 'b'), (3, 6, 'c');",
    );
    assert_eq!(
        KeyClassifier::new(&source).classify("ledger").await.unwrap(),
        KeyClassification::PatternMatched(vec!["entry_id".into()])
    );
}

#[tokio::test]
async fn test_ratio_is_strictly_greater() {
    // 1,2,3,4,5,7: four steps out of five pairs
    let source = source(
        "CREATE TABLE t (row_id INTEGER);
         INSERT INTO t VALUES (1), (2), (3), (4), (5), (7);",
    );
    let strict = KeyClassifier::new(&source).with_auto_increment_ratio(0.8);
    assert!(!strict.is_auto_increment("t", "row_id").await.unwrap());
    let lenient = KeyClassifier::new(&source).with_auto_increment_ratio(0.75);
    assert!(lenient.is_auto_increment("t", "row_id").await.unwrap());
}

#[tokio::test]
async fn test_nulls_ignored_by_uniqueness() {
    let source = source(
        "CREATE TABLE t (id INTEGER);
         INSERT INTO t VALUES (1), (NULL), (2), (NULL), (3);",
    );
    let classifier = KeyClassifier::new(&source);
    assert!(classifier.is_unique("t", "id").await.unwrap());
    assert_eq!(
        classifier.classify("t").await.unwrap(),
        KeyClassification::NamedId("id".into())
    );
}
