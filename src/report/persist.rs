//! CSV files of an output directory.
//!
//! ```text
//! {output}/verified_relationships.csv   Report rows
//! {output}/table_columns.csv            column catalog
//! {output}/table_descriptions.csv       table descriptions
//! {output}/create_tables.sql            DDL export
//! ```
//!
//! Headers are always written, even for empty files. Booleans are written
//! as `True`/`False`, and missing values as empty cells.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::catalog::ColumnCatalogRow;
use super::{Report, ReportResult, ReportRow};
use crate::discovery::TableDescription;

pub const RELATIONSHIPS_FILE: &str = "verified_relationships.csv";
pub const COLUMNS_FILE: &str = "table_columns.csv";
pub const DESCRIPTIONS_FILE: &str = "table_descriptions.csv";
pub const DDL_FILE: &str = "create_tables.sql";

pub const REPORT_COLUMNS: [&str; 11] = [
    "table_name",
    "field_name",
    "field_type",
    "relationship",
    "verified",
    "status",
    "referential_integrity",
    "null_percentage",
    "distinct_values_source",
    "distinct_values_target",
    "coverage",
];

pub const CATALOG_COLUMNS: [&str; 6] = [
    "table_name",
    "column_name",
    "data_type",
    "is_nullable",
    "key_type",
    "default_value",
];

pub const DESCRIPTION_COLUMNS: [&str; 2] = ["table_name", "description"];

/// `True`/`False`/empty encoding of optional booleans.
pub mod title_bool {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(true) => s.serialize_str("True"),
            Some(false) => s.serialize_str("False"),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("true") || s == "1" => Ok(Some(true)),
            Some(s) if s.eq_ignore_ascii_case("false") || s == "0" => Ok(Some(false)),
            Some(other) => Err(D::Error::custom(format!("invalid boolean '{}'", other))),
        }
    }
}

fn write_rows<W: io::Write, T: Serialize>(
    writer: W,
    header: &[&str],
    rows: &[T],
) -> ReportResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_rows<R: io::Read, T: DeserializeOwned>(reader: R) -> ReportResult<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

impl Report {
    pub fn to_writer<W: io::Write>(&self, writer: W) -> ReportResult<()> {
        write_rows(writer, &REPORT_COLUMNS, &self.rows)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> ReportResult<Self> {
        let rows: Vec<ReportRow> = read_rows(reader)?;
        Ok(Self { rows })
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> ReportResult<()> {
        self.to_writer(File::create(path)?)
    }

    pub fn read_csv(path: impl AsRef<Path>) -> ReportResult<Self> {
        Self::from_reader(File::open(path)?)
    }
}

pub fn write_catalog(path: impl AsRef<Path>, rows: &[ColumnCatalogRow]) -> ReportResult<()> {
    write_rows(File::create(path)?, &CATALOG_COLUMNS, rows)
}

pub fn read_catalog(path: impl AsRef<Path>) -> ReportResult<Vec<ColumnCatalogRow>> {
    read_rows(File::open(path)?)
}

pub fn write_descriptions(
    path: impl AsRef<Path>,
    descriptions: &[TableDescription],
) -> ReportResult<()> {
    write_rows(File::create(path)?, &DESCRIPTION_COLUMNS, descriptions)
}
