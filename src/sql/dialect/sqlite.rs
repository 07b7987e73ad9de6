//! SQLite SQL dialect.
//!
//! SQLite differences from ANSI:
//! - Double-quote identifier quoting
//! - Catalog read from `sqlite_master` and the `pragma_table_info` table function
//! - `pragma_table_info.pk` holds the 1-based position inside the primary key

use super::helpers;
use super::SqlDialect;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn list_tables_sql(&self) -> String {
        "SELECT name AS table_name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name"
            .to_string()
    }

    fn list_columns_sql(&self, table: &str) -> String {
        format!(
            "SELECT name AS column_name, type AS data_type, \
             CASE WHEN \"notnull\" = 0 THEN 1 ELSE 0 END AS is_nullable, \
             dflt_value AS default_value \
             FROM pragma_table_info({}) ORDER BY cid",
            self.quote_string(table)
        )
    }

    fn primary_key_sql(&self, table: &str) -> String {
        format!(
            "SELECT name AS column_name FROM pragma_table_info({}) WHERE pk > 0 ORDER BY pk",
            self.quote_string(table)
        )
    }
}
