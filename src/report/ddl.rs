//! `CREATE TABLE` export.
//!
//! Rebuilds one statement per catalogued table, adding a `PRIMARY KEY`
//! clause and one `FOREIGN KEY` clause per verified incoming edge. The
//! script is bracketed by the dialect's preamble and postamble.

use std::collections::HashMap;

use super::catalog::ColumnCatalogRow;
use super::Report;
use crate::discovery::ColumnRef;
use crate::sql::{Dialect, SqlDialect};

pub const DDL_HEADER: &str =
    "-- Auto-generated CREATE TABLE statements with foreign key relationships";

/// Render the full DDL script for `catalog`, wiring keys from `report`.
///
/// Table order follows first appearance in the catalog. A table's primary
/// key is the first verified PK row naming it, else all of its `PRI`
/// columns.
pub fn generate_ddl(catalog: &[ColumnCatalogRow], report: &Report, dialect: Dialect) -> String {
    let mut tables: Vec<&str> = Vec::new();
    let mut columns: HashMap<&str, Vec<&ColumnCatalogRow>> = HashMap::new();
    for row in catalog {
        let entry = columns.entry(row.table_name.as_str()).or_default();
        if entry.is_empty() {
            tables.push(row.table_name.as_str());
        }
        entry.push(row);
    }

    let mut verified_pk: HashMap<String, String> = HashMap::new();
    let mut foreign_keys: HashMap<String, Vec<(String, ColumnRef)>> = HashMap::new();
    for (parent, child) in report.verified_edges() {
        verified_pk
            .entry(parent.table.clone())
            .or_insert_with(|| parent.field.clone());
        let fks = foreign_keys.entry(child.table.clone()).or_default();
        if !fks.iter().any(|(f, p)| *f == child.field && *p == parent) {
            fks.push((child.field, parent));
        }
    }

    let mut out = String::new();
    out.push_str(DDL_HEADER);
    out.push('\n');
    if let Some(pre) = dialect.ddl_preamble() {
        out.push_str(pre);
        out.push('\n');
    }

    for table in tables {
        let cols = &columns[table];
        let mut lines: Vec<String> = cols.iter().map(|c| column_definition(c, dialect)).collect();

        let pk: Vec<String> = match verified_pk.get(table) {
            Some(field) => vec![field.clone()],
            None => cols
                .iter()
                .filter(|c| c.is_primary())
                .map(|c| c.column_name.clone())
                .collect(),
        };
        if !pk.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", quote_list(&pk, dialect)));
        }

        for (field, parent) in foreign_keys.get(table).into_iter().flatten() {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                dialect.quote_identifier(field),
                dialect.quote_identifier(&parent.table),
                dialect.quote_identifier(&parent.field),
            ));
        }

        out.push('\n');
        out.push_str(&format!("CREATE TABLE {} (\n", dialect.quote_identifier(table)));
        out.push_str(
            &lines
                .iter()
                .map(|l| format!("  {}", l))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        out.push_str("\n)");
        if let Some(options) = dialect.table_options() {
            out.push(' ');
            out.push_str(options);
        }
        out.push_str(";\n");
    }

    if let Some(post) = dialect.ddl_postamble() {
        out.push('\n');
        out.push_str(post);
        out.push('\n');
    }
    out
}

fn quote_list(names: &[String], dialect: Dialect) -> String {
    names
        .iter()
        .map(|n| dialect.quote_identifier(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_definition(col: &ColumnCatalogRow, dialect: Dialect) -> String {
    let mut def = format!("{} {}", dialect.quote_identifier(&col.column_name), col.data_type);
    if !col.nullable() {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = render_default(col, dialect) {
        def.push_str(" DEFAULT ");
        def.push_str(&default);
    }
    def
}

fn render_default(col: &ColumnCatalogRow, dialect: Dialect) -> Option<String> {
    let raw = col.default_value.as_deref()?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("NULL") {
        return None;
    }
    if raw.starts_with('\'') || !is_textual(&col.data_type) {
        return Some(raw.to_string());
    }
    Some(dialect.quote_string(raw))
}

// Types whose defaults are literals rather than expressions
fn is_textual(data_type: &str) -> bool {
    let lower = data_type.to_ascii_lowercase();
    let base = lower.split('(').next().unwrap_or("").trim();
    base.contains("char") || base.contains("text") || base == "date" || base == "datetime"
}
