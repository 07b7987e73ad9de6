//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - `information_schema` scoped with `current_schema()`

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn list_tables_sql(&self) -> String {
        "SELECT table_name \
         FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
         ORDER BY table_name"
            .to_string()
    }

    fn list_columns_sql(&self, table: &str) -> String {
        format!(
            "SELECT column_name, data_type, \
             CASE WHEN is_nullable = 'YES' THEN 1 ELSE 0 END AS is_nullable, \
             column_default AS default_value \
             FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = {} \
             ORDER BY ordinal_position",
            self.quote_string(table)
        )
    }

    fn primary_key_sql(&self, table: &str) -> String {
        format!(
            "SELECT kcu.column_name \
             FROM information_schema.table_constraints AS tc \
             JOIN information_schema.key_column_usage AS kcu \
             ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
             WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = current_schema() \
             AND tc.table_name = {} \
             ORDER BY kcu.ordinal_position",
            self.quote_string(table)
        )
    }
}
