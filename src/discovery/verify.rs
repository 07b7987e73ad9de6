//! Statistical verification of candidate relationships.

use tracing::debug;

use super::{thresholds, CandidateMatch, Stats, VerificationResult};
use crate::source::rows::{IntegrityCounts, UsageCounts};
use crate::source::{Datasource, DatasourceExt, SourceResult};
use crate::sql::QueryBuilder;

/// Checks candidate matches against live data.
///
/// A match is accepted when the share of distinct fk values with no parent
/// is at most the integrity threshold. Accepted matches carry usage
/// statistics; query failures become rejections.
pub struct RelationshipVerifier<'a> {
    source: &'a dyn Datasource,
    queries: QueryBuilder,
    integrity_threshold: f64,
}

impl<'a> RelationshipVerifier<'a> {
    pub fn new(source: &'a dyn Datasource) -> Self {
        Self {
            source,
            queries: QueryBuilder::new(source.dialect()),
            integrity_threshold: thresholds::INTEGRITY,
        }
    }

    pub fn with_integrity_threshold(mut self, threshold: f64) -> Self {
        self.integrity_threshold = threshold;
        self
    }

    /// Verify one candidate match.
    pub async fn verify(&self, candidate: &CandidateMatch) -> VerificationResult {
        let result = match self.try_verify(candidate).await {
            Ok(result) => result,
            Err(e) => VerificationResult::rejected(format!("Error during verification: {}", e)),
        };
        debug!(
            candidate = %candidate,
            verified = result.is_verified(),
            reason = result.reason().unwrap_or(""),
            "verified candidate"
        );
        result
    }

    /// Verify a batch, keeping input order.
    pub async fn verify_all(&self, candidates: &[CandidateMatch]) -> Vec<VerificationResult> {
        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            results.push(self.verify(candidate).await);
        }
        results
    }

    async fn try_verify(&self, candidate: &CandidateMatch) -> SourceResult<VerificationResult> {
        let (pk, fk) = (&candidate.pk, &candidate.fk);

        let sql = self
            .queries
            .referential_integrity(&pk.table, &pk.field, &fk.table, &fk.field);
        let integrity: IntegrityCounts = self.source.query_one(&sql).await?;
        let ratio = integrity.invalid_ratio();
        if ratio > self.integrity_threshold {
            return Ok(VerificationResult::rejected(format!(
                "Found {} FK values not present in PK ({:.1}% of {} distinct values)",
                integrity.invalid_distinct,
                ratio * 100.0,
                integrity.total_distinct
            )));
        }

        let sql = self
            .queries
            .usage_stats(&pk.table, &pk.field, &fk.table, &fk.field);
        let usage: UsageCounts = self.source.query_one(&sql).await?;

        Ok(VerificationResult::Verified {
            stats: usage_stats(&usage),
        })
    }
}

/// Percentages from raw usage counts; empty denominators give zero.
fn usage_stats(usage: &UsageCounts) -> Stats {
    let null_percentage = if usage.total_rows == 0 {
        0.0
    } else {
        (usage.total_rows - usage.non_null_count) as f64 / usage.total_rows as f64 * 100.0
    };
    let coverage_percent = if usage.distinct_pk == 0 {
        0.0
    } else {
        usage.distinct_fk as f64 / usage.distinct_pk as f64 * 100.0
    };
    Stats {
        null_percentage,
        distinct_fk: usage.distinct_fk,
        distinct_pk: usage.distinct_pk,
        coverage_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_stats_percentages() {
        let stats = usage_stats(&UsageCounts {
            total_rows: 10,
            non_null_count: 8,
            distinct_fk: 3,
            distinct_pk: 4,
        });
        assert_eq!(stats.null_percentage, 20.0);
        assert_eq!(stats.coverage_percent, 75.0);
    }

    #[test]
    fn test_usage_stats_empty_tables() {
        let stats = usage_stats(&UsageCounts {
            total_rows: 0,
            non_null_count: 0,
            distinct_fk: 0,
            distinct_pk: 0,
        });
        assert_eq!(stats.null_percentage, 0.0);
        assert_eq!(stats.coverage_percent, 0.0);
    }
}
