//! Relationship report.
//!
//! A [`Report`] is the flat, persistable form of a [`DiscoveryOutcome`]: one
//! row per key column role. Verified relationships appear twice, once at
//! the parent (`→ child.field`) and once at the child (`← parent.field`),
//! with mirrored distinct counts.
//!
//! - [`relationship`] - the `relationship` column mini-format
//! - [`persist`] - CSV files written next to each other in an output directory
//! - [`catalog`] - the column catalog (`table_columns.csv`)
//! - [`ddl`] - `CREATE TABLE` export from catalog and report

pub mod catalog;
pub mod ddl;
pub mod persist;
pub mod relationship;

pub use catalog::{column_catalog, ColumnCatalogRow};
pub use ddl::generate_ddl;
pub use relationship::{Relationship, RelationshipParseError};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::discovery::{
    CandidateMatch, ColumnRef, DiscoveryOutcome, Stats, VerificationResult,
};

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors reading or writing report files.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub mod status {
    pub const VERIFIED: &str = "verified";
    pub const UNUSED_PK: &str = "unused primary key";
    pub const UNUSED_FK: &str = "unused foreign key";
    pub const NO_IDENTIFIERS: &str = "no identifiers detected";
}

/// Role of the row's column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    #[serde(rename = "PK")]
    Pk,
    #[serde(rename = "FK")]
    Fk,
}

/// One row of `verified_relationships.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub table_name: String,
    pub field_name: String,
    pub field_type: Option<FieldRole>,
    pub relationship: String,
    #[serde(with = "persist::title_bool")]
    pub verified: Option<bool>,
    pub status: String,
    #[serde(with = "persist::title_bool")]
    pub referential_integrity: Option<bool>,
    pub null_percentage: Option<f64>,
    pub distinct_values_source: Option<i64>,
    pub distinct_values_target: Option<i64>,
    pub coverage: Option<f64>,
}

impl ReportRow {
    fn verified_edge(
        at: &ColumnRef,
        role: FieldRole,
        relationship: Relationship,
        stats: &Stats,
        source: i64,
        target: i64,
    ) -> Self {
        Self {
            table_name: at.table.clone(),
            field_name: at.field.clone(),
            field_type: Some(role),
            relationship: relationship.to_string(),
            verified: Some(true),
            status: status::VERIFIED.to_string(),
            referential_integrity: Some(true),
            null_percentage: Some(stats.null_percentage),
            distinct_values_source: Some(source),
            distinct_values_target: Some(target),
            coverage: Some(stats.coverage_percent),
        }
    }

    fn unused(at: &ColumnRef, role: FieldRole, status: &str) -> Self {
        Self {
            table_name: at.table.clone(),
            field_name: at.field.clone(),
            field_type: Some(role),
            relationship: Relationship::NoRelationships.to_string(),
            verified: Some(false),
            status: status.to_string(),
            referential_integrity: None,
            null_percentage: None,
            distinct_values_source: None,
            distinct_values_target: None,
            coverage: None,
        }
    }

    fn untracked(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            field_name: String::new(),
            field_type: None,
            relationship: Relationship::Empty.to_string(),
            verified: Some(false),
            status: status::NO_IDENTIFIERS.to_string(),
            referential_integrity: None,
            null_percentage: None,
            distinct_values_source: None,
            distinct_values_target: None,
            coverage: None,
        }
    }

    pub fn column(&self) -> ColumnRef {
        ColumnRef::new(&self.table_name, &self.field_name)
    }

    pub fn is_verified(&self) -> bool {
        self.verified == Some(true)
    }
}

/// The full relationship report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Flatten an outcome into rows: verified pairs in match order, unused
    /// pks, unused fks, then untracked tables that have no other row.
    pub fn assemble(outcome: &DiscoveryOutcome) -> Self {
        let mut rows = Vec::new();
        let mut used_pks = HashSet::new();
        let mut used_fks = HashSet::new();

        for (m, stats) in outcome.verified() {
            rows.push(ReportRow::verified_edge(
                &m.pk,
                FieldRole::Pk,
                Relationship::Outgoing(m.fk.clone()),
                stats,
                stats.distinct_pk,
                stats.distinct_fk,
            ));
            rows.push(ReportRow::verified_edge(
                &m.fk,
                FieldRole::Fk,
                Relationship::Incoming(m.pk.clone()),
                stats,
                stats.distinct_fk,
                stats.distinct_pk,
            ));
            used_pks.insert(&m.pk);
            used_fks.insert(&m.fk);
        }

        for pk in outcome.pk_candidates.iter().filter(|c| !used_pks.contains(c)) {
            rows.push(ReportRow::unused(pk, FieldRole::Pk, status::UNUSED_PK));
        }
        for fk in outcome.fk_candidates.iter().filter(|c| !used_fks.contains(c)) {
            rows.push(ReportRow::unused(fk, FieldRole::Fk, status::UNUSED_FK));
        }

        let represented: HashSet<String> = rows.iter().map(|r| r.table_name.clone()).collect();
        for table in &outcome.untracked_tables {
            if !represented.contains(table) {
                rows.push(ReportRow::untracked(table));
            }
        }

        debug!(rows = rows.len(), "assembled report");
        Self { rows }
    }

    /// Rebuild candidates, verified matches and untracked tables.
    ///
    /// Rows with a malformed relationship are skipped with a warning.
    pub fn reconstruct(&self) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();
        let mut pks = OrderedSet::default();
        let mut fks = OrderedSet::default();
        let mut untracked = OrderedSet::default();
        let mut tables_with_pk_rows = HashSet::new();
        let mut table_order = OrderedSet::default();

        for row in &self.rows {
            let relationship = match row.relationship.parse::<Relationship>() {
                Ok(r) => r,
                Err(e) => {
                    warn!(table = %row.table_name, field = %row.field_name, error = %e, "skipping report row");
                    continue;
                }
            };
            table_order.insert(row.table_name.clone());

            match (row.field_type, relationship) {
                (Some(FieldRole::Pk), Relationship::Outgoing(child)) if row.is_verified() => {
                    let pk = row.column();
                    tables_with_pk_rows.insert(pk.table.clone());
                    pks.insert(pk.clone());
                    fks.insert(child.clone());
                    outcome.matches.push(CandidateMatch::new(pk, child));
                    outcome.results.push(VerificationResult::Verified {
                        stats: row_stats(row),
                    });
                }
                (Some(FieldRole::Fk), Relationship::Incoming(parent)) if row.is_verified() => {
                    tables_with_pk_rows.insert(parent.table.clone());
                    pks.insert(parent);
                    fks.insert(row.column());
                }
                (Some(FieldRole::Pk), _) => {
                    tables_with_pk_rows.insert(row.table_name.clone());
                    pks.insert(row.column());
                }
                (Some(FieldRole::Fk), _) => {
                    fks.insert(row.column());
                }
                (None, _) => {
                    if row.status == status::NO_IDENTIFIERS {
                        untracked.insert(row.table_name.clone());
                    }
                }
            }
        }

        for table in table_order.items {
            if !tables_with_pk_rows.contains(&table) {
                untracked.insert(table);
            }
        }

        outcome.pk_candidates = pks.items;
        outcome.fk_candidates = fks.items;
        outcome.untracked_tables = untracked.items;
        outcome
    }

    /// Verified PK rows with their outgoing target, in row order.
    pub fn verified_edges(&self) -> impl Iterator<Item = (ColumnRef, ColumnRef)> + '_ {
        self.rows
            .iter()
            .filter(|r| r.field_type == Some(FieldRole::Pk) && r.is_verified())
            .filter_map(|r| match r.relationship.parse::<Relationship>() {
                Ok(Relationship::Outgoing(child)) => Some((r.column(), child)),
                _ => None,
            })
    }
}

/// Stats of a verified PK row; missing cells read as zero.
fn row_stats(row: &ReportRow) -> Stats {
    Stats {
        null_percentage: row.null_percentage.unwrap_or(0.0),
        distinct_pk: row.distinct_values_source.unwrap_or(0),
        distinct_fk: row.distinct_values_target.unwrap_or(0),
        coverage_percent: row.coverage.unwrap_or(0.0),
    }
}

/// Insertion-ordered set.
struct OrderedSet<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T: std::hash::Hash + Eq + Clone> OrderedSet<T> {
    fn insert(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }
}
