//! Schema introspection.
//!
//! Read-only catalog access on top of a [`crate::source::Datasource`]: table
//! names, column definitions, declared primary keys and row samples.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     SchemaIntrospector                          │
//! │  - list_tables()            - declared_primary_key()            │
//! │  - list_columns()           - sample_rows()                     │
//! │  - table_metadata()         - catalog()                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │  dialect catalog SQL
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Datasource::run_query()                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use keyscout::metadata::SchemaIntrospector;
//! use keyscout::source::SqliteSource;
//!
//! let source = SqliteSource::open("shop.db")?;
//! let introspector = SchemaIntrospector::new(&source);
//! for table in introspector.list_tables().await? {
//!     let pk = introspector.declared_primary_key(&table).await?;
//! }
//! ```

mod introspector;
mod types;

pub use introspector::{MetadataResult, SchemaIntrospector};
pub use types::*;
