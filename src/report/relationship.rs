//! The `relationship` column mini-format.
//!
//! ```text
//! relationship := outgoing | incoming | none | ""
//! outgoing     := "→ " table "." field
//! incoming     := "← " table "." field
//! none         := "No relationships"
//! ```
//!
//! The table part is everything before the last `.`, so dotted table names
//! survive a round trip.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::discovery::ColumnRef;

pub const OUTGOING_ARROW: char = '→';
pub const INCOMING_ARROW: char = '←';
pub const NO_RELATIONSHIPS: &str = "No relationships";

// Greedy table group so the split happens at the last dot
static EDGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([→←]) (.+)\.([^.]+)$").expect("edge pattern is valid"));

/// A relationship cell that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed relationship '{0}'")]
pub struct RelationshipParseError(pub String);

/// Parsed value of the `relationship` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    /// On a PK row: the referencing child column.
    Outgoing(ColumnRef),
    /// On an FK row: the referenced parent column.
    Incoming(ColumnRef),
    /// Candidate without a verified relationship.
    NoRelationships,
    /// Untracked-table row.
    Empty,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outgoing(target) => write!(f, "{} {}", OUTGOING_ARROW, target),
            Self::Incoming(target) => write!(f, "{} {}", INCOMING_ARROW, target),
            Self::NoRelationships => f.write_str(NO_RELATIONSHIPS),
            Self::Empty => Ok(()),
        }
    }
}

impl FromStr for Relationship {
    type Err = RelationshipParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Empty);
        }
        if trimmed == NO_RELATIONSHIPS {
            return Ok(Self::NoRelationships);
        }

        let caps = EDGE
            .captures(trimmed)
            .ok_or_else(|| RelationshipParseError(s.to_string()))?;
        let target = ColumnRef::new(&caps[2], &caps[3]);
        match &caps[1] {
            "→" => Ok(Self::Outgoing(target)),
            _ => Ok(Self::Incoming(target)),
        }
    }
}
