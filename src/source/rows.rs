//! Typed views of the query shapes issued by discovery.
//!
//! Each struct corresponds to one builder in [`crate::sql::queries`] or one
//! catalog query of [`crate::sql::SqlDialect`]; field names match the column
//! aliases in the SQL.

use super::error::SourceResult;
use super::value::Row;

/// Conversion from an untyped result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> SourceResult<Self>;
}

/// `list_tables_sql` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNameRow {
    pub table_name: String,
}

impl FromRow for TableNameRow {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            table_name: row.string("table_name")?,
        })
    }
}

/// `list_columns_sql` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
}

impl FromRow for ColumnRow {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            column_name: row.string("column_name")?,
            // SQLite allows typeless columns
            data_type: row.opt_string("data_type")?.unwrap_or_default(),
            is_nullable: row.bool("is_nullable")?,
            default_value: row.opt_string("default_value")?,
        })
    }
}

/// `primary_key_sql` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumnRow {
    pub column_name: String,
}

impl FromRow for KeyColumnRow {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            column_name: row.string("column_name")?,
        })
    }
}

/// Result of [`crate::sql::QueryBuilder::uniqueness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniquenessCounts {
    pub non_null_count: i64,
    pub distinct_count: i64,
}

impl UniquenessCounts {
    pub fn is_unique(&self) -> bool {
        self.non_null_count == self.distinct_count
    }
}

impl FromRow for UniquenessCounts {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            non_null_count: row.i64_or_zero("non_null_count")?,
            distinct_count: row.i64_or_zero("distinct_count")?,
        })
    }
}

/// Result of [`crate::sql::QueryBuilder::sequence_steps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounts {
    pub pair_count: i64,
    pub step_count: i64,
}

impl SequenceCounts {
    /// Fraction of adjacent pairs that step by exactly one; `None` without pairs.
    pub fn step_ratio(&self) -> Option<f64> {
        (self.pair_count > 0).then(|| self.step_count as f64 / self.pair_count as f64)
    }
}

impl FromRow for SequenceCounts {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            pair_count: row.i64_or_zero("pair_count")?,
            step_count: row.i64_or_zero("step_count")?,
        })
    }
}

/// Result of [`crate::sql::QueryBuilder::referential_integrity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityCounts {
    pub total_distinct: i64,
    pub invalid_distinct: i64,
}

impl IntegrityCounts {
    /// Share of distinct fk values with no parent; zero when there are none.
    pub fn invalid_ratio(&self) -> f64 {
        if self.total_distinct == 0 {
            0.0
        } else {
            self.invalid_distinct as f64 / self.total_distinct as f64
        }
    }
}

impl FromRow for IntegrityCounts {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            total_distinct: row.i64_or_zero("total_distinct")?,
            invalid_distinct: row.i64_or_zero("invalid_distinct")?,
        })
    }
}

/// Result of [`crate::sql::QueryBuilder::usage_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounts {
    pub total_rows: i64,
    pub non_null_count: i64,
    pub distinct_fk: i64,
    pub distinct_pk: i64,
}

impl FromRow for UsageCounts {
    fn from_row(row: &Row<'_>) -> SourceResult<Self> {
        Ok(Self {
            total_rows: row.i64_or_zero("total_rows")?,
            non_null_count: row.i64_or_zero("non_null_count")?,
            distinct_fk: row.i64_or_zero("distinct_fk")?,
            distinct_pk: row.i64_or_zero("distinct_pk")?,
        })
    }
}
