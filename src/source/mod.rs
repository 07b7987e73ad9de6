//! Datasource abstraction.
//!
//! Discovery only needs one capability from a database: run a SQL string and
//! get back a table of named columns. [`Datasource`] is that capability;
//! [`DatasourceExt`] layers typed row mapping on top of it.
//!
//! [`SqliteSource`] is the built-in implementation.

mod error;
pub mod rows;
mod sqlite;
mod value;

pub use error::{SourceError, SourceResult};
pub use rows::FromRow;
pub use sqlite::SqliteSource;
pub use value::{QueryResult, Row, Value};

use async_trait::async_trait;
use tracing::debug;

use crate::sql::Dialect;

/// A queryable relational store.
#[async_trait]
pub trait Datasource: Send + Sync {
    /// Dialect used to render identifiers and catalog queries.
    fn dialect(&self) -> Dialect;

    /// Stable description of the connection, used as a cache key component.
    fn fingerprint(&self) -> String;

    /// Run a query and return its full result.
    async fn run_query(&self, sql: &str) -> SourceResult<QueryResult>;
}

/// Typed query helpers, available on every [`Datasource`].
#[async_trait]
pub trait DatasourceExt: Datasource {
    /// Run a query and map every row.
    async fn query_all<T>(&self, sql: &str) -> SourceResult<Vec<T>>
    where
        T: FromRow + Send + 'static,
    {
        debug!(sql, "query");
        let result = self.run_query(sql).await?;
        result.rows().map(|row| T::from_row(&row)).collect()
    }

    /// Run a query expected to return exactly one row (aggregates).
    async fn query_one<T>(&self, sql: &str) -> SourceResult<T>
    where
        T: FromRow + Send + 'static,
    {
        debug!(sql, "query");
        let result = self.run_query(sql).await?;
        let row = result.first().ok_or(SourceError::EmptyResult)?;
        T::from_row(&row)
    }
}

impl<D: Datasource + ?Sized> DatasourceExt for D {}

/// Open a datasource for a configured driver name and location.
///
/// Only SQLite has a built-in runner; other recognised dialects are reported
/// as unsupported.
pub fn connect(driver: &str, path: &str) -> SourceResult<Box<dyn Datasource>> {
    match Dialect::parse(driver) {
        Some(Dialect::Sqlite) => {
            let source = if path.is_empty() || path == ":memory:" {
                SqliteSource::open_in_memory()?
            } else {
                SqliteSource::open(path)?
            };
            Ok(Box::new(source))
        }
        _ => Err(SourceError::UnsupportedDriver(driver.to_string())),
    }
}
