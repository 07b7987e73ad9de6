//! Column catalog rows (`table_columns.csv`).

use serde::{Deserialize, Serialize};

use crate::metadata::TableMetadata;

pub const KEY_TYPE_PRIMARY: &str = "PRI";

/// One column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCatalogRow {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    /// `YES` or `NO`.
    pub is_nullable: String,
    /// `PRI` for declared primary key columns, otherwise empty.
    pub key_type: String,
    pub default_value: Option<String>,
}

impl ColumnCatalogRow {
    pub fn nullable(&self) -> bool {
        self.is_nullable.eq_ignore_ascii_case("YES")
    }

    pub fn is_primary(&self) -> bool {
        self.key_type == KEY_TYPE_PRIMARY
    }
}

/// Flatten table metadata into catalog rows, in table then column order.
pub fn column_catalog(tables: &[TableMetadata]) -> Vec<ColumnCatalogRow> {
    tables
        .iter()
        .flat_map(|table| {
            table.columns.iter().map(move |c| ColumnCatalogRow {
                table_name: table.name.clone(),
                column_name: c.name.clone(),
                data_type: c.data_type.clone(),
                is_nullable: if c.is_nullable { "YES" } else { "NO" }.to_string(),
                key_type: if c.is_primary_key { KEY_TYPE_PRIMARY } else { "" }.to_string(),
                default_value: c.default_value.clone(),
            })
        })
        .collect()
}
