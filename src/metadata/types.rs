//! Catalog types.

use serde::{Deserialize, Serialize};

/// A column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Database-specific type name (may be empty for typeless SQLite columns).
    pub data_type: String,
    /// Whether NULL values are allowed.
    pub is_nullable: bool,
    /// Default value expression.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Whether the column is part of the declared primary key.
    #[serde(default)]
    pub is_primary_key: bool,
}

/// Columns and declared key of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// Declared primary key columns in key order.
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl TableMetadata {
    /// Find a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}
