//! Catalog, description and DDL exports.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use keyscout::cache::MetadataCache;
use keyscout::discovery::{
    describe_tables, DiscoveryConfig, DiscoveryPipeline, OfflineRater, TableDescriber,
};
use keyscout::metadata::SchemaIntrospector;
use keyscout::prelude::*;
use keyscout::report::persist::{read_catalog, write_catalog, write_descriptions, COLUMNS_FILE};
use keyscout::report::{column_catalog, generate_ddl};
use keyscout::source::QueryResult;

fn shop() -> SqliteSource {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE users (id INTEGER NOT NULL, status VARCHAR(10) DEFAULT 'active');
             INSERT INTO users (id) VALUES (1), (2), (3);
             CREATE TABLE orders (order_id INTEGER, user_id INTEGER);
             INSERT INTO orders VALUES (100, 1), (205, 1), (310, 2);",
        )
        .unwrap();
    source
}

/// Counts calls and echoes the sample size.
#[derive(Default)]
struct CountingDescriber {
    calls: AtomicUsize,
}

#[async_trait]
impl TableDescriber for CountingDescriber {
    async fn describe(&self, table: &str, sample: &QueryResult) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        format!("{} with {} sampled rows", table, sample.len())
    }
}

#[tokio::test]
async fn test_ddl_from_saved_catalog() {
    let source = shop();
    let outcome = DiscoveryPipeline::new(&source, &OfflineRater, DiscoveryConfig::default())
        .run()
        .await
        .unwrap();
    let report = Report::assemble(&outcome);
    let tables = SchemaIntrospector::new(&source).catalog().await.unwrap();
    let catalog = column_catalog(&tables);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(COLUMNS_FILE);
    write_catalog(&path, &catalog).unwrap();
    let loaded = read_catalog(&path).unwrap();
    assert_eq!(loaded, catalog);

    let ddl = generate_ddl(&loaded, &report, Dialect::Sqlite);
    assert!(ddl.starts_with("-- Auto-generated CREATE TABLE statements"));
    assert!(ddl.contains(r#""id" INTEGER NOT NULL"#));
    assert!(ddl.contains(r#""status" VARCHAR(10) DEFAULT 'active'"#));
    assert!(ddl.contains(r#"PRIMARY KEY ("id")"#));
    assert!(ddl.contains(r#"FOREIGN KEY ("user_id") REFERENCES "users"("id")"#));

    let mysql = generate_ddl(&loaded, &report, Dialect::MySql);
    assert!(mysql.contains("FOREIGN KEY (`user_id`) REFERENCES `users`(`id`)"));
    assert!(mysql.starts_with(
        "-- Auto-generated CREATE TABLE statements with foreign key relationships\nSET FOREIGN_KEY_CHECKS=0;"
    ));
}

#[tokio::test]
async fn test_descriptions_are_cached_per_connection() {
    let source = shop();
    let cache = MetadataCache::open_in_memory().unwrap();
    let describer = CountingDescriber::default();

    let first = describe_tables(&source, &describer, Some(&cache), 2)
        .await
        .unwrap();
    assert_eq!(describer.calls.load(Ordering::SeqCst), 2);
    let orders = first.iter().find(|d| d.table_name == "orders").unwrap();
    assert_eq!(orders.description, "orders with 2 sampled rows");

    let second = describe_tables(&source, &describer, Some(&cache), 2)
        .await
        .unwrap();
    assert_eq!(describer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(second, first);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table_descriptions.csv");
    write_descriptions(&path, &second).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("table_name,description"));
}

#[tokio::test]
async fn test_placeholder_descriptions_not_cached() {
    let source = shop();
    let cache = MetadataCache::open_in_memory().unwrap();
    let descriptions = describe_tables(&source, &OfflineRater, Some(&cache), 5)
        .await
        .unwrap();
    assert!(descriptions
        .iter()
        .all(|d| d.description.starts_with("Error generating description: ")));
    assert!(cache.is_empty().unwrap());
}
