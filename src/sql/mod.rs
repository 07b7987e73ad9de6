//! SQL generation module.
//!
//! - [`dialect`] - identifier quoting and catalog queries per dialect
//! - [`queries`] - the statistical query shapes used by discovery

pub mod dialect;
pub mod queries;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{Dialect, SqlDialect};
pub use queries::QueryBuilder;
