//! # keyscout
//!
//! Infers the implicit primary and foreign keys of a relational database
//! whose schema declares few or none of them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Datasource (SQLite runner, dialect SQL)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Tables, columns, declared primary keys             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [discovery::keys]
//! ┌─────────────────────────────────────────────────────────┐
//! │   PK / FK candidates (unique + sequential, id-like)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [discovery::naming, verify, fallback]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Name matches → integrity check → rated cross matches   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report]
//! ┌─────────────────────────────────────────────────────────┐
//! │   verified_relationships.csv, table_columns.csv,         │
//! │   table_descriptions.csv, create_tables.sql              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod discovery;
pub mod llm;
pub mod logging;
pub mod metadata;
pub mod report;
pub mod source;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::discovery::{
        CandidateMatch, ColumnRef, DiscoveryConfig, DiscoveryOutcome, DiscoveryPipeline,
        OfflineRater, RelationshipRater, Stats, Strength, VerificationResult,
    };
    pub use crate::report::Report;
    pub use crate::source::{connect, Datasource, DatasourceExt, SqliteSource};
    pub use crate::sql::{Dialect, SqlDialect};
}
