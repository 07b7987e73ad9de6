//! Datasource-specific error types.

use thiserror::Error;

/// Result type for datasource operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while running queries against a datasource.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The SQLite backend rejected the statement or failed to open.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The shared connection lock was poisoned by a panicking holder.
    #[error("connection lock poisoned")]
    Poisoned,

    /// A result row lacked a column the caller expected.
    #[error("missing column '{0}' in query result")]
    MissingColumn(String),

    /// A cell could not be converted to the requested type.
    #[error("column '{column}' expected {expected}, found {found}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected type description.
        expected: &'static str,
        /// Description of the value actually found.
        found: String,
    },

    /// A single-row query returned no rows.
    #[error("query returned no rows")]
    EmptyResult,

    /// Configured driver has no built-in implementation.
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),
}

impl SourceError {
    /// Create a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected,
            found: found.into(),
        }
    }
}
