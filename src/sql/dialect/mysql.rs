//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Catalog lives in `INFORMATION_SCHEMA`, scoped with `DATABASE()`
//! - Primary key constraints are always named `PRIMARY`

use super::helpers;
use super::SqlDialect;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn list_tables_sql(&self) -> String {
        "SELECT TABLE_NAME AS table_name \
         FROM INFORMATION_SCHEMA.TABLES \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
         ORDER BY TABLE_NAME"
            .to_string()
    }

    fn list_columns_sql(&self, table: &str) -> String {
        format!(
            "SELECT COLUMN_NAME AS column_name, COLUMN_TYPE AS data_type, \
             CASE WHEN IS_NULLABLE = 'YES' THEN 1 ELSE 0 END AS is_nullable, \
             COLUMN_DEFAULT AS default_value \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = {} \
             ORDER BY ORDINAL_POSITION",
            self.quote_string(table)
        )
    }

    fn primary_key_sql(&self, table: &str) -> String {
        format!(
            "SELECT COLUMN_NAME AS column_name \
             FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = {} AND CONSTRAINT_NAME = 'PRIMARY' \
             ORDER BY ORDINAL_POSITION",
            self.quote_string(table)
        )
    }

    fn ddl_preamble(&self) -> Option<&'static str> {
        Some("SET FOREIGN_KEY_CHECKS=0;")
    }

    fn ddl_postamble(&self) -> Option<&'static str> {
        Some("SET FOREIGN_KEY_CHECKS=1;")
    }

    fn table_options(&self) -> Option<&'static str> {
        Some("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci")
    }
}
