//! Query shapes issued by the discovery pipeline.
//!
//! Every statistic is computed by the database; only aggregate rows come
//! back over the wire. Each builder has a matching `FromRow` struct in
//! [`crate::source::rows`] whose field names are the column aliases used here.

use super::dialect::{Dialect, SqlDialect};

/// Builds the fixed set of data queries for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    dialect: Dialect,
}

impl QueryBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn ident(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    /// Non-null and distinct counts of a column (`non_null_count`, `distinct_count`).
    pub fn uniqueness(&self, table: &str, field: &str) -> String {
        let t = self.ident(table);
        let f = self.ident(field);
        format!(
            "SELECT COUNT({f}) AS non_null_count, COUNT(DISTINCT {f}) AS distinct_count \
             FROM {t} WHERE {f} IS NOT NULL"
        )
    }

    /// Adjacent-pair statistics over the ascending non-null values
    /// (`pair_count`, `step_count`), where a step is `current = previous + 1`.
    pub fn sequence_steps(&self, table: &str, field: &str) -> String {
        let t = self.ident(table);
        let f = self.ident(field);
        format!(
            "SELECT COUNT(prev_value) AS pair_count, \
             COALESCE(SUM(CASE WHEN cur_value = prev_value + 1 THEN 1 ELSE 0 END), 0) AS step_count \
             FROM (SELECT {f} AS cur_value, LAG({f}) OVER (ORDER BY {f}) AS prev_value \
             FROM {t} WHERE {f} IS NOT NULL) AS ordered_values"
        )
    }

    /// Distinct non-null fk values and how many of them are missing from the
    /// pk column (`total_distinct`, `invalid_distinct`).
    pub fn referential_integrity(
        &self,
        pk_table: &str,
        pk_field: &str,
        fk_table: &str,
        fk_field: &str,
    ) -> String {
        let pt = self.ident(pk_table);
        let pf = self.ident(pk_field);
        let ft = self.ident(fk_table);
        let ff = self.ident(fk_field);
        format!(
            "SELECT COUNT(*) AS total_distinct, \
             COALESCE(SUM(CASE WHEN pk_values.pk_value IS NULL THEN 1 ELSE 0 END), 0) AS invalid_distinct \
             FROM (SELECT DISTINCT {ff} AS fk_value FROM {ft} WHERE {ff} IS NOT NULL) AS fk_values \
             LEFT JOIN (SELECT DISTINCT {pf} AS pk_value FROM {pt}) AS pk_values \
             ON fk_values.fk_value = pk_values.pk_value"
        )
    }

    /// Usage statistics of an fk column against its parent
    /// (`total_rows`, `non_null_count`, `distinct_fk`, `distinct_pk`).
    pub fn usage_stats(
        &self,
        pk_table: &str,
        pk_field: &str,
        fk_table: &str,
        fk_field: &str,
    ) -> String {
        let pt = self.ident(pk_table);
        let pf = self.ident(pk_field);
        let ft = self.ident(fk_table);
        let ff = self.ident(fk_field);
        format!(
            "SELECT COUNT(*) AS total_rows, COUNT({ff}) AS non_null_count, \
             COUNT(DISTINCT {ff}) AS distinct_fk, \
             (SELECT COUNT(DISTINCT {pf}) FROM {pt}) AS distinct_pk \
             FROM {ft}"
        )
    }

    /// First `limit` rows of a table, all columns.
    pub fn sample_rows(&self, table: &str, limit: u64) -> String {
        format!("SELECT * FROM {} LIMIT {}", self.ident(table), limit)
    }
}
