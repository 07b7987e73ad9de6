//! SQLite datasource on `rusqlite`.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::error::{SourceError, SourceResult};
use super::value::{QueryResult, Value};
use super::Datasource;
use crate::sql::Dialect;

/// A SQLite database file (or in-memory database).
pub struct SqliteSource {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteSource {
    /// Open a database file.
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: path.display().to_string(),
        })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> SourceResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: ":memory:".to_string(),
        })
    }

    /// Execute a batch of `;`-separated statements (schema setup, fixtures).
    pub fn execute_batch(&self, sql: &str) -> SourceResult<()> {
        let conn = self.conn.lock().map_err(|_| SourceError::Poisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn query_sync(&self, sql: &str) -> SourceResult<QueryResult> {
        let conn = self.conn.lock().map_err(|_| SourceError::Poisoned)?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(convert(row.get_ref(i)?));
            }
            out.push(values);
        }

        Ok(QueryResult::new(columns, out))
    }
}

fn convert(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Text(format!("<blob {} bytes>", bytes.len())),
    }
}

#[async_trait]
impl Datasource for SqliteSource {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn fingerprint(&self) -> String {
        format!("sqlite:{}", self.location)
    }

    async fn run_query(&self, sql: &str) -> SourceResult<QueryResult> {
        self.query_sync(sql)
    }
}
