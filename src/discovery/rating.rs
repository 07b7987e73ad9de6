//! Plausibility ratings and table descriptions.
//!
//! Both capabilities are infallible at this seam: implementations turn
//! their own failures into `weak` ratings or placeholder text, so the
//! pipeline never aborts because a language model is unavailable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CandidateMatch;
use crate::source::QueryResult;

/// Ordered plausibility of a candidate relationship.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Strength {
    #[serde(rename = "very weak")]
    VeryWeak,
    #[default]
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "very strong")]
    VeryStrong,
}

impl Strength {
    pub const ALL: [Strength; 5] = [
        Strength::VeryWeak,
        Strength::Weak,
        Strength::Normal,
        Strength::Strong,
        Strength::VeryStrong,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Normal => "normal",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        }
    }

    /// Parse a rating label, case-insensitive; `_` and `-` count as spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL.into_iter().find(|st| st.as_str() == normalized)
    }

    /// Fallback rating when none could be obtained.
    pub fn unavailable(count: usize) -> Vec<Strength> {
        vec![Strength::Weak; count]
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rates a batch of candidate matches, one strength per item, same order.
#[async_trait]
pub trait RelationshipRater: Send + Sync {
    async fn rate(&self, matches: &[CandidateMatch]) -> Vec<Strength>;
}

/// Produces a short natural-language description of a table from sample rows.
#[async_trait]
pub trait TableDescriber: Send + Sync {
    async fn describe(&self, table: &str, sample: &QueryResult) -> String;
}

/// Start of every placeholder description.
pub const PLACEHOLDER_PREFIX: &str = "Error generating description: ";

/// Placeholder used when a description could not be produced.
pub fn description_placeholder(error: impl std::fmt::Display) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, error)
}

/// Rater/describer used when no language model is configured.
///
/// Every pair is rated `weak`, which keeps the fallback stage from
/// accepting anything at the default minimum strength.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRater;

#[async_trait]
impl RelationshipRater for OfflineRater {
    async fn rate(&self, matches: &[CandidateMatch]) -> Vec<Strength> {
        Strength::unavailable(matches.len())
    }
}

#[async_trait]
impl TableDescriber for OfflineRater {
    async fn describe(&self, _table: &str, _sample: &QueryResult) -> String {
        description_placeholder("language model disabled")
    }
}
