//! Short natural-language descriptions of tables from sample rows.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::rating::{description_placeholder, TableDescriber, PLACEHOLDER_PREFIX};
use super::{DiscoveryError, DiscoveryResult};
use crate::cache::{connection_hash, MetadataCache};
use crate::metadata::SchemaIntrospector;
use crate::source::Datasource;

/// One row of `table_descriptions.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub table_name: String,
    pub description: String,
}

/// Describe every table, reusing cached descriptions for this connection.
///
/// Only the table listing can fail; sampling or describing failures yield a
/// placeholder description, and cache failures are logged and ignored.
pub async fn describe_tables(
    source: &dyn Datasource,
    describer: &dyn TableDescriber,
    cache: Option<&MetadataCache>,
    sample_rows: u64,
) -> DiscoveryResult<Vec<TableDescription>> {
    let introspector = SchemaIntrospector::new(source);
    let tables = introspector
        .list_tables()
        .await
        .map_err(DiscoveryError::Introspection)?;
    let conn_hash = connection_hash(&source.fingerprint());

    let mut descriptions = Vec::with_capacity(tables.len());
    let mut cached = 0usize;
    for table in tables {
        if let Some(text) = cache.and_then(|c| lookup(c, &conn_hash, &table)) {
            cached += 1;
            descriptions.push(TableDescription {
                table_name: table,
                description: text,
            });
            continue;
        }

        let description = match introspector.sample_rows(&table, sample_rows).await {
            Ok(sample) => describer.describe(&table, &sample).await,
            Err(e) => description_placeholder(e),
        };

        if let Some(c) = cache {
            if !description.starts_with(PLACEHOLDER_PREFIX) {
                if let Err(e) = c.set_description(&conn_hash, &table, &description) {
                    warn!(table = %table, error = %e, "failed to cache description");
                }
            }
        }
        debug!(table = %table, "described");
        descriptions.push(TableDescription {
            table_name: table,
            description,
        });
    }

    info!(tables = descriptions.len(), cached, "table descriptions complete");
    Ok(descriptions)
}

fn lookup(cache: &MetadataCache, conn_hash: &str, table: &str) -> Option<String> {
    match cache.get_description(conn_hash, table) {
        Ok(hit) => hit,
        Err(e) => {
            warn!(table, error = %e, "failed to read cached description");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::OfflineRater;
    use crate::source::{QueryResult, SqliteSource};
    use async_trait::async_trait;

    struct RowCounter;

    #[async_trait]
    impl TableDescriber for RowCounter {
        async fn describe(&self, table: &str, sample: &QueryResult) -> String {
            format!("{} sampled {} rows", table, sample.len())
        }
    }

    fn source() -> SqliteSource {
        let source = SqliteSource::open_in_memory().unwrap();
        source
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
                 INSERT INTO users (name) VALUES ('a'), ('b'), ('c'), ('d'), ('e'), ('f'), ('g');",
            )
            .unwrap();
        source
    }

    #[tokio::test]
    async fn test_samples_limited_rows() {
        let source = source();
        let out = describe_tables(&source, &RowCounter, None, 5).await.unwrap();
        assert_eq!(
            out,
            vec![TableDescription {
                table_name: "users".into(),
                description: "users sampled 5 rows".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_cached_description_is_reused() {
        let source = source();
        let cache = MetadataCache::open_in_memory().unwrap();
        let conn_hash = connection_hash(&source.fingerprint());
        cache.set_description(&conn_hash, "users", "People").unwrap();

        let out = describe_tables(&source, &RowCounter, Some(&cache), 5)
            .await
            .unwrap();
        assert_eq!(out[0].description, "People");
    }

    #[tokio::test]
    async fn test_placeholder_is_not_cached() {
        let source = source();
        let cache = MetadataCache::open_in_memory().unwrap();
        let out = describe_tables(&source, &OfflineRater, Some(&cache), 5)
            .await
            .unwrap();
        assert!(out[0].description.starts_with(PLACEHOLDER_PREFIX));
        assert!(cache.is_empty().unwrap());
    }
}
