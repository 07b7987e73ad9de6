//! Catalog queries against a datasource.

use tracing::debug;

use super::types::{ColumnInfo, TableMetadata};
use crate::source::rows::{ColumnRow, KeyColumnRow, TableNameRow};
use crate::source::{Datasource, DatasourceExt, QueryResult, SourceResult};
use crate::sql::{QueryBuilder, SqlDialect};

/// Result type for metadata operations.
pub type MetadataResult<T> = SourceResult<T>;

/// Dialect-aware catalog reader.
#[derive(Clone, Copy)]
pub struct SchemaIntrospector<'a> {
    source: &'a dyn Datasource,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(source: &'a dyn Datasource) -> Self {
        Self { source }
    }

    /// Base table names, ordered by name.
    pub async fn list_tables(&self) -> MetadataResult<Vec<String>> {
        let sql = self.source.dialect().list_tables_sql();
        let rows: Vec<TableNameRow> = self.source.query_all(&sql).await?;
        Ok(rows.into_iter().map(|r| r.table_name).collect())
    }

    /// Column definitions in ordinal order. `is_primary_key` is not set here.
    pub async fn list_columns(&self, table: &str) -> MetadataResult<Vec<ColumnInfo>> {
        let sql = self.source.dialect().list_columns_sql(table);
        let rows: Vec<ColumnRow> = self.source.query_all(&sql).await?;
        Ok(rows
            .into_iter()
            .map(|r| ColumnInfo {
                name: r.column_name,
                data_type: r.data_type,
                is_nullable: r.is_nullable,
                default_value: r.default_value,
                is_primary_key: false,
            })
            .collect())
    }

    /// Declared primary key columns in key order; empty when none is declared.
    pub async fn declared_primary_key(&self, table: &str) -> MetadataResult<Vec<String>> {
        let sql = self.source.dialect().primary_key_sql(table);
        let rows: Vec<KeyColumnRow> = self.source.query_all(&sql).await?;
        let key: Vec<String> = rows.into_iter().map(|r| r.column_name).collect();
        debug!(table, ?key, "declared primary key");
        Ok(key)
    }

    /// Columns plus declared key of one table.
    pub async fn table_metadata(&self, table: &str) -> MetadataResult<TableMetadata> {
        let mut columns = self.list_columns(table).await?;
        let primary_key = self.declared_primary_key(table).await?;
        for column in &mut columns {
            column.is_primary_key = primary_key.iter().any(|k| k == &column.name);
        }
        Ok(TableMetadata {
            name: table.to_string(),
            columns,
            primary_key,
        })
    }

    /// Metadata for every table, in table-name order.
    pub async fn catalog(&self) -> MetadataResult<Vec<TableMetadata>> {
        let mut tables = Vec::new();
        for name in self.list_tables().await? {
            tables.push(self.table_metadata(&name).await?);
        }
        Ok(tables)
    }

    /// The first `limit` rows of a table.
    pub async fn sample_rows(&self, table: &str, limit: u64) -> MetadataResult<QueryResult> {
        let sql = QueryBuilder::new(self.source.dialect()).sample_rows(table, limit);
        self.source.run_query(&sql).await
    }
}
