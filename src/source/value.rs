//! Tabular query results.
//!
//! A [`QueryResult`] is a list of named columns plus rows of [`Value`] cells.
//! Accessors are lenient: drivers disagree about whether `COUNT(*)` comes
//! back as an integer, a decimal or a string.

use serde::{Deserialize, Serialize};

use super::error::{SourceError, SourceResult};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of the value. Integral reals and numeric text convert.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Real(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && f.is_finite())
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type description used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One result row. Cells are resolved by column name through the owning
/// [`QueryResult`]'s column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Look up a cell by column name (case-insensitive).
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
    }

    fn require(&self, column: &str) -> SourceResult<&'a Value> {
        self.get(column)
            .ok_or_else(|| SourceError::MissingColumn(column.to_string()))
    }

    /// Required integer cell. NULL is a type mismatch.
    pub fn i64(&self, column: &str) -> SourceResult<i64> {
        let value = self.require(column)?;
        value
            .as_i64()
            .ok_or_else(|| SourceError::type_mismatch(column, "integer", value.kind()))
    }

    /// Integer cell where NULL (e.g. `SUM` over no rows) reads as zero.
    pub fn i64_or_zero(&self, column: &str) -> SourceResult<i64> {
        match self.require(column)? {
            Value::Null => Ok(0),
            _ => self.i64(column),
        }
    }

    /// Required text cell. Numbers are rendered to text.
    pub fn string(&self, column: &str) -> SourceResult<String> {
        match self.require(column)? {
            Value::Null => Err(SourceError::type_mismatch(column, "text", "null")),
            v => Ok(v.to_string()),
        }
    }

    /// Optional text cell.
    pub fn opt_string(&self, column: &str) -> SourceResult<Option<String>> {
        match self.require(column)? {
            Value::Null => Ok(None),
            v => Ok(Some(v.to_string())),
        }
    }

    /// Boolean cell. Accepts bools, 0/1 and `YES`/`NO` style text.
    pub fn bool(&self, column: &str) -> SourceResult<bool> {
        let value = self.require(column)?;
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Text(s) => match s.trim().to_ascii_uppercase().as_str() {
                "YES" | "TRUE" | "1" => Ok(true),
                "NO" | "FALSE" | "0" => Ok(false),
                _ => Err(SourceError::type_mismatch(column, "bool", value.kind())),
            },
            other => other
                .as_i64()
                .map(|i| i != 0)
                .ok_or_else(|| SourceError::type_mismatch(column, "bool", other.kind())),
        }
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// The tabular result of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterate rows with name-based cell access.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<Row<'_>> {
        self.rows().next()
    }

    /// Render as a plain-text grid, used when sampling rows for a prompt.
    pub fn to_text_table(&self) -> String {
        let mut out = self.columns.join(" | ");
        for row in &self.rows {
            out.push('\n');
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&cells.join(" | "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> QueryResult {
        QueryResult::new(
            vec!["Total".into(), "name".into(), "flag".into(), "gap".into()],
            vec![vec![
                Value::Text("42".into()),
                Value::Text("alice".into()),
                Value::Text("YES".into()),
                Value::Null,
            ]],
        )
    }

    #[test]
    fn test_lenient_integer_conversion() {
        assert_eq!(Value::Real(3.0).as_i64(), Some(3));
        assert_eq!(Value::Real(3.5).as_i64(), None);
        assert_eq!(Value::Text(" 7 ".into()).as_i64(), Some(7));
        assert_eq!(Value::Text("7.0".into()).as_i64(), Some(7));
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let r = result();
        let row = r.first().unwrap();
        assert_eq!(row.i64("total").unwrap(), 42);
        assert_eq!(row.string("NAME").unwrap(), "alice");
        assert!(row.bool("flag").unwrap());
    }

    #[test]
    fn test_null_handling() {
        let r = result();
        let row = r.first().unwrap();
        assert_eq!(row.i64_or_zero("gap").unwrap(), 0);
        assert_eq!(row.opt_string("gap").unwrap(), None);
        assert!(matches!(
            row.i64("gap"),
            Err(SourceError::TypeMismatch { .. })
        ));
        assert!(matches!(
            row.i64("missing"),
            Err(SourceError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_text_table() {
        let r = QueryResult::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![Value::Integer(1), Value::Text("a".into())],
                vec![Value::Integer(2), Value::Null],
            ],
        );
        assert_eq!(r.to_text_table(), "id | name\n1 | a\n2 | NULL");
    }
}
