//! SQL Dialect definitions.
//!
//! This module provides a trait-based abstraction for the SQL dialect
//! differences that matter to key discovery:
//!
//! - Identifier quoting: `"` (SQLite/PG), `` ` `` (MySQL)
//! - Catalog queries: `sqlite_master` vs `INFORMATION_SCHEMA` vs `information_schema`
//! - DDL framing around exported `CREATE TABLE` scripts
//!
//! # Usage
//!
//! ```ignore
//! use keyscout::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::MySql;
//! let quoted = dialect.quote_identifier("order");  // `order`
//! ```

pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use serde::{Deserialize, Serialize};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    // =========================================================================
    // Catalog Introspection
    // =========================================================================

    /// Query listing base tables as a single `table_name` column.
    fn list_tables_sql(&self) -> String;

    /// Query listing a table's columns as
    /// `column_name, data_type, is_nullable (1/0), default_value`.
    fn list_columns_sql(&self, table: &str) -> String;

    /// Query listing declared primary-key columns (`column_name`) in key order.
    fn primary_key_sql(&self, table: &str) -> String;

    // =========================================================================
    // DDL Export
    // =========================================================================

    /// Statement emitted before exported `CREATE TABLE` statements.
    fn ddl_preamble(&self) -> Option<&'static str> {
        None
    }

    /// Statement emitted after exported `CREATE TABLE` statements.
    fn ddl_postamble(&self) -> Option<&'static str> {
        None
    }

    /// Options appended after the closing parenthesis of `CREATE TABLE`.
    fn table_options(&self) -> Option<&'static str> {
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    MySql,
    Postgres,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &Sqlite,
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
        }
    }

    /// Parse a dialect name (case-insensitive, common aliases accepted).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn list_tables_sql(&self) -> String {
        self.dialect().list_tables_sql()
    }

    fn list_columns_sql(&self, table: &str) -> String {
        self.dialect().list_columns_sql(table)
    }

    fn primary_key_sql(&self, table: &str) -> String {
        self.dialect().primary_key_sql(table)
    }

    fn ddl_preamble(&self) -> Option<&'static str> {
        self.dialect().ddl_preamble()
    }

    fn ddl_postamble(&self) -> Option<&'static str> {
        self.dialect().ddl_postamble()
    }

    fn table_options(&self) -> Option<&'static str> {
        self.dialect().table_options()
    }
}
