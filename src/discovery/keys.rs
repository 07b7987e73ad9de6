//! Primary-key classification and foreign-key enumeration.
//!
//! Each table walks a fallback chain and stops at the first step that yields
//! at least one field:
//!
//! 1. declared primary key columns that are unique and auto-incrementing
//! 2. the first column named `id` (any case) that passes the same checks
//! 3. every ID-like column that passes the same checks
//!
//! A table that declares a key whose columns all fail is untracked without
//! trying steps 2 and 3.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::{
    thresholds, ColumnRef, DiscoveryError, DiscoveryResult, KeyClassification,
};
use crate::metadata::{ColumnInfo, SchemaIntrospector};
use crate::source::rows::{SequenceCounts, UniquenessCounts};
use crate::source::{Datasource, DatasourceExt, SourceResult};
use crate::sql::QueryBuilder;

/// Whether a column name looks like an identifier: contains `_id` in any
/// case, or contains an upper-case `ID`.
pub fn is_id_like(name: &str) -> bool {
    name.to_lowercase().contains("_id") || name.contains("ID")
}

/// Why a table ended up without key candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntrackedReason {
    /// The declared key failed the uniqueness or sequence checks.
    DeclaredKeyRejected,
    /// No `id` or ID-like column passed the checks.
    NoIdentifiers,
}

impl std::fmt::Display for UntrackedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeclaredKeyRejected => write!(f, "declared key is not unique and sequential"),
            Self::NoIdentifiers => write!(f, "no identifiers detected"),
        }
    }
}

/// Key candidates of a whole schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub pk_candidates: Vec<ColumnRef>,
    pub fk_candidates: Vec<ColumnRef>,
    pub untracked_tables: Vec<String>,
}

/// Runs the classification chain against live data.
pub struct KeyClassifier<'a> {
    source: &'a dyn Datasource,
    queries: QueryBuilder,
    auto_increment_ratio: f64,
}

impl<'a> KeyClassifier<'a> {
    pub fn new(source: &'a dyn Datasource) -> Self {
        Self {
            source,
            queries: QueryBuilder::new(source.dialect()),
            auto_increment_ratio: thresholds::AUTO_INCREMENT_RATIO,
        }
    }

    pub fn with_auto_increment_ratio(mut self, ratio: f64) -> Self {
        self.auto_increment_ratio = ratio;
        self
    }

    /// Classify one table.
    pub async fn classify(&self, table: &str) -> DiscoveryResult<KeyClassification> {
        let introspector = SchemaIntrospector::new(self.source);
        let declared = introspector
            .declared_primary_key(table)
            .await
            .map_err(DiscoveryError::Introspection)?;
        let columns = introspector
            .list_columns(table)
            .await
            .map_err(DiscoveryError::Introspection)?;
        Ok(self.classify_with(table, &declared, &columns).await)
    }

    async fn classify_with(
        &self,
        table: &str,
        declared: &[String],
        columns: &[ColumnInfo],
    ) -> KeyClassification {
        if !declared.is_empty() {
            let mut passing = Vec::new();
            for field in declared {
                if self.is_key_like(table, field).await {
                    passing.push(field.clone());
                }
            }
            return if passing.is_empty() {
                debug!(table, ?declared, "declared key rejected");
                KeyClassification::Untracked(UntrackedReason::DeclaredKeyRejected)
            } else {
                KeyClassification::Declared(passing)
            };
        }

        for column in columns.iter().filter(|c| c.name.eq_ignore_ascii_case("id")) {
            if self.is_key_like(table, &column.name).await {
                return KeyClassification::NamedId(column.name.clone());
            }
        }

        let mut passing = Vec::new();
        for column in columns.iter().filter(|c| is_id_like(&c.name)) {
            if self.is_key_like(table, &column.name).await {
                passing.push(column.name.clone());
            }
        }
        if passing.is_empty() {
            KeyClassification::Untracked(UntrackedReason::NoIdentifiers)
        } else {
            KeyClassification::PatternMatched(passing)
        }
    }

    /// Unique and auto-incrementing. A failing check query counts as a miss.
    async fn is_key_like(&self, table: &str, field: &str) -> bool {
        let checks = async {
            Ok::<_, crate::source::SourceError>(
                self.is_unique(table, field).await?
                    && self.is_auto_increment(table, field).await?,
            )
        };
        match checks.await {
            Ok(passed) => {
                debug!(table, field, passed, "key checks");
                passed
            }
            Err(e) => {
                warn!(table, field, error = %e, "key check query failed");
                false
            }
        }
    }

    /// `COUNT(DISTINCT field) == COUNT(field)`, nulls excluded.
    pub async fn is_unique(&self, table: &str, field: &str) -> SourceResult<bool> {
        let sql = self.queries.uniqueness(table, field);
        let counts: UniquenessCounts = self.source.query_one(&sql).await?;
        Ok(counts.is_unique())
    }

    /// More than `auto_increment_ratio` of adjacent sorted non-null values
    /// step by exactly one. Columns with fewer than two values are not.
    pub async fn is_auto_increment(&self, table: &str, field: &str) -> SourceResult<bool> {
        let sql = self.queries.sequence_steps(table, field);
        let counts: SequenceCounts = self.source.query_one(&sql).await?;
        Ok(counts
            .step_ratio()
            .is_some_and(|ratio| ratio > self.auto_increment_ratio))
    }

    /// Classify every table, then enumerate foreign-key candidates.
    pub async fn discover(&self) -> DiscoveryResult<CandidateSet> {
        let introspector = SchemaIntrospector::new(self.source);
        let tables = introspector
            .list_tables()
            .await
            .map_err(DiscoveryError::Introspection)?;

        let mut set = CandidateSet::default();
        let mut columns_by_table = Vec::with_capacity(tables.len());

        for table in &tables {
            let declared = introspector
                .declared_primary_key(table)
                .await
                .map_err(DiscoveryError::Introspection)?;
            let columns = introspector
                .list_columns(table)
                .await
                .map_err(DiscoveryError::Introspection)?;

            let classification = self.classify_with(table, &declared, &columns).await;
            debug!(table, ?classification, "classified");
            match &classification {
                KeyClassification::Untracked(_) => set.untracked_tables.push(table.clone()),
                other => set
                    .pk_candidates
                    .extend(other.fields().into_iter().map(|f| ColumnRef::new(table, f))),
            }
            columns_by_table.push((table, columns));
        }

        set.fk_candidates = enumerate_foreign_keys(&columns_by_table, &set.pk_candidates);

        info!(
            tables = tables.len(),
            pk_candidates = set.pk_candidates.len(),
            fk_candidates = set.fk_candidates.len(),
            untracked = set.untracked_tables.len(),
            "key classification complete"
        );
        Ok(set)
    }
}

/// ID-like columns that are not primary-key candidates, in table then
/// column order.
fn enumerate_foreign_keys(
    columns_by_table: &[(&String, Vec<ColumnInfo>)],
    pk_candidates: &[ColumnRef],
) -> Vec<ColumnRef> {
    let pks: HashSet<&ColumnRef> = pk_candidates.iter().collect();
    columns_by_table
        .iter()
        .flat_map(|(table, columns)| {
            columns
                .iter()
                .filter(|c| is_id_like(&c.name))
                .map(move |c| ColumnRef::new(table.as_str(), c.name.as_str()))
        })
        .filter(|col| !pks.contains(col))
        .collect()
}
