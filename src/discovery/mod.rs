//! Key discovery and relationship verification.
//!
//! This module infers the implicit relational schema of a database that has
//! no declared foreign-key constraints.
//!
//! # Architecture
//!
//! The pipeline runs in five stages:
//!
//! 1. **Key classification** - per-table primary-key candidates through a
//!    fallback chain (declared key, `id` column, unique `*_id` columns)
//! 2. **Foreign-key enumeration** - every ID-like column that is not a
//!    primary-key candidate
//! 3. **Name matching** - pair foreign keys to primary keys by base name
//! 4. **Verification** - referential integrity and usage statistics computed
//!    by the database
//! 5. **Fallback** - leftover keys are cross-matched, rated by a
//!    [`RelationshipRater`], and the promising pairs are verified again
//!
//! # Example
//!
//! ```ignore
//! use keyscout::discovery::{DiscoveryConfig, DiscoveryPipeline, OfflineRater};
//! use keyscout::source::SqliteSource;
//!
//! let source = SqliteSource::open("shop.db")?;
//! let rater = OfflineRater;
//! let outcome = DiscoveryPipeline::new(&source, &rater, DiscoveryConfig::default())
//!     .run()
//!     .await?;
//! ```

pub mod describe;
pub mod fallback;
mod inflection;
pub mod keys;
pub mod naming;
pub mod pipeline;
pub mod rating;
pub mod verify;

pub use describe::{describe_tables, TableDescription};
pub use fallback::{unused_candidates, FallbackMatcher};
pub use keys::{is_id_like, CandidateSet, KeyClassifier, UntrackedReason};
pub use naming::{base_name, match_candidates, NameNormalization};
pub use pipeline::DiscoveryPipeline;
pub use rating::{OfflineRater, RelationshipRater, Strength, TableDescriber};
pub use verify::RelationshipVerifier;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::SourceError;

/// Default acceptance thresholds.
pub mod thresholds {
    /// Maximum share of distinct fk values allowed to have no parent.
    pub const INTEGRITY: f64 = 0.1;
    /// Minimum share of adjacent sorted values that must step by one for a
    /// column to count as auto-incrementing.
    pub const AUTO_INCREMENT_RATIO: f64 = 0.95;
    /// Rows sampled per table for descriptions.
    pub const SAMPLE_ROWS: u64 = 5;
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that abort a discovery run.
///
/// Everything past introspection degrades instead of failing: verification
/// errors become rejections and rating errors become `weak` ratings.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Listing tables, columns or declared keys failed.
    #[error("schema introspection failed: {0}")]
    Introspection(#[source] SourceError),
}

/// A column identified by table and field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub field: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// How a candidate match was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchOrigin {
    /// Base names of the two columns agree.
    #[default]
    Naming,
    /// Cross-matched leftovers, kept because of their rating.
    Fallback { strength: Strength },
}

impl std::fmt::Display for MatchOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Naming => write!(f, "naming"),
            Self::Fallback { strength } => write!(f, "fallback ({})", strength),
        }
    }
}

/// A hypothesized edge: `fk` references `pk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub pk: ColumnRef,
    pub fk: ColumnRef,
    #[serde(default)]
    pub origin: MatchOrigin,
}

impl CandidateMatch {
    pub fn new(pk: ColumnRef, fk: ColumnRef) -> Self {
        Self {
            pk,
            fk,
            origin: MatchOrigin::Naming,
        }
    }

    pub fn with_origin(mut self, origin: MatchOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Same pk and fk columns, regardless of origin.
    pub fn same_pair(&self, other: &CandidateMatch) -> bool {
        self.pk == other.pk && self.fk == other.fk
    }
}

impl std::fmt::Display for CandidateMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.pk, self.fk)
    }
}

/// Usage statistics of a verified relationship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Share of child rows whose fk is NULL, 0..=100.
    pub null_percentage: f64,
    /// Distinct non-null fk values.
    pub distinct_fk: i64,
    /// Distinct pk values in the parent table.
    pub distinct_pk: i64,
    /// `distinct_fk / distinct_pk * 100`.
    pub coverage_percent: f64,
}

/// Outcome of verifying one candidate match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VerificationResult {
    Verified { stats: Stats },
    Rejected { reason: String },
}

impl VerificationResult {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    pub fn stats(&self) -> Option<&Stats> {
        match self {
            Self::Verified { stats } => Some(stats),
            Self::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Verified { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}

/// Primary-key classification of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClassification {
    /// Declared primary key columns that passed the uniqueness and sequence checks.
    Declared(Vec<String>),
    /// A column literally named `id`.
    NamedId(String),
    /// Unique, auto-incrementing ID-like columns.
    PatternMatched(Vec<String>),
    /// No candidate could be established.
    Untracked(UntrackedReason),
}

impl KeyClassification {
    /// Candidate fields, empty for untracked tables.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Declared(cols) | Self::PatternMatched(cols) => {
                cols.iter().map(String::as_str).collect()
            }
            Self::NamedId(col) => vec![col.as_str()],
            Self::Untracked(_) => Vec::new(),
        }
    }

    pub fn is_untracked(&self) -> bool {
        matches!(self, Self::Untracked(_))
    }
}

/// Tunables handed to the pipeline. Built from [`crate::config::Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Maximum invalid share of distinct fk values.
    pub integrity_threshold: f64,
    /// Step ratio a column must exceed to count as auto-incrementing.
    pub auto_increment_ratio: f64,
    /// Lowest rating that sends a fallback pair to verification.
    pub min_strength: Strength,
    pub name_normalization: NameNormalization,
    /// Run the rated fallback stage.
    pub fallback_enabled: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            integrity_threshold: thresholds::INTEGRITY,
            auto_increment_ratio: thresholds::AUTO_INCREMENT_RATIO,
            min_strength: Strength::Normal,
            name_normalization: NameNormalization::default(),
            fallback_enabled: true,
        }
    }
}

/// Everything a discovery run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryOutcome {
    pub pk_candidates: Vec<ColumnRef>,
    pub fk_candidates: Vec<ColumnRef>,
    pub untracked_tables: Vec<String>,
    /// Candidate matches, parallel to `results`.
    pub matches: Vec<CandidateMatch>,
    pub results: Vec<VerificationResult>,
}

impl DiscoveryOutcome {
    /// Matches paired with their verification results.
    pub fn pairs(&self) -> impl Iterator<Item = (&CandidateMatch, &VerificationResult)> {
        self.matches.iter().zip(self.results.iter())
    }

    /// Verified matches with their statistics.
    pub fn verified(&self) -> impl Iterator<Item = (&CandidateMatch, &Stats)> {
        self.pairs()
            .filter_map(|(m, r)| r.stats().map(|stats| (m, stats)))
    }

    pub fn verified_count(&self) -> usize {
        self.verified().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_display_and_order() {
        let a = ColumnRef::new("orders", "user_id");
        let b = ColumnRef::new("users", "id");
        assert_eq!(a.to_string(), "orders.user_id");
        assert!(a < b);
    }

    #[test]
    fn test_verification_accessors() {
        let stats = Stats {
            null_percentage: 0.0,
            distinct_fk: 2,
            distinct_pk: 3,
            coverage_percent: 66.0,
        };
        let ok = VerificationResult::Verified { stats };
        assert!(ok.is_verified());
        assert_eq!(ok.stats(), Some(&stats));
        assert_eq!(ok.reason(), None);

        let no = VerificationResult::rejected("nope");
        assert!(!no.is_verified());
        assert_eq!(no.stats(), None);
        assert_eq!(no.reason(), Some("nope"));
    }

    #[test]
    fn test_classification_fields() {
        assert_eq!(KeyClassification::NamedId("id".into()).fields(), vec!["id"]);
        assert!(KeyClassification::Untracked(UntrackedReason::NoIdentifiers)
            .fields()
            .is_empty());
    }

    #[test]
    fn test_outcome_verified_filters_rejections() {
        let m1 = CandidateMatch::new(ColumnRef::new("users", "id"), ColumnRef::new("orders", "user_id"));
        let m2 = CandidateMatch::new(ColumnRef::new("users", "id"), ColumnRef::new("logs", "user_id"));
        let outcome = DiscoveryOutcome {
            matches: vec![m1.clone(), m2],
            results: vec![
                VerificationResult::Verified {
                    stats: Stats {
                        null_percentage: 0.0,
                        distinct_fk: 1,
                        distinct_pk: 1,
                        coverage_percent: 100.0,
                    },
                },
                VerificationResult::rejected("x"),
            ],
            ..Default::default()
        };
        let verified: Vec<_> = outcome.verified().map(|(m, _)| m.clone()).collect();
        assert_eq!(verified, vec![m1]);
    }
}
