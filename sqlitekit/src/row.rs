//! Owned result rows
//!
//! A [`Row`] is a snapshot of the cursor's current row. It owns its values, so
//! it outlives the step that produced it, and it can be turned into JSON or
//! deserialized into a Rust struct with serde.

use crate::error::Result;
use libsqlite3_sys as ffi;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::raw::c_int;
use std::sync::Arc;

/// Storage class of a column value, as reported by `sqlite3_column_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    pub(crate) fn from_code(code: c_int) -> Self {
        match code {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Real,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Null => "NULL",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Null => ColumnType::Null,
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Real,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Real value; integers are widened
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Convert to a serde_json value; blobs become arrays of bytes
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::json!(i),
            Value::Real(f) => serde_json::json!(f),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Blob(b) => serde_json::json!(b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => f.write_str(&format_real(*r)),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

/// Render a REAL the way SQLite's `%!.15g` does
///
/// Fifteen significant digits, trailing zeros dropped but a `.0` always kept,
/// and exponent notation outside `1e-4..1e15`.
fn format_real(r: f64) -> String {
    if r.is_nan() {
        return "NaN".to_string();
    }
    if r.is_infinite() {
        return if r > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }

    let scientific = format!("{:.14e}", r);
    let (mantissa, exp) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if !(-4..15).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", keep_point(mantissa), sign, exp.abs())
    } else {
        let fixed = format!("{:.*}", (14 - exp) as usize, r);
        keep_point(&fixed)
    }
}

fn keep_point(digits: &str) -> String {
    let trimmed = if digits.contains('.') {
        digits.trim_end_matches('0')
    } else {
        digits
    };
    match trimmed.strip_suffix('.') {
        Some(whole) => format!("{}.0", whole),
        None if !trimmed.contains('.') => format!("{}.0", trimmed),
        None => trimmed.to_string(),
    }
}

/// One result row, detached from the statement
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Row { columns, values }
    }

    /// Column names, shared by every row of the same cursor
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a 0-based column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column with the given name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    /// Column rendered as text, the way `sqlite3_column_text` would render it
    ///
    /// Numbers are formatted, NULL becomes `None`.
    pub fn text(&self, index: usize) -> Option<String> {
        match self.values.get(index)? {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
            other => Some(other.to_string()),
        }
    }

    /// Row as a JSON object keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.values.len());
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.insert(column.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Deserialize the row into any type implementing `Deserialize`
    ///
    /// Column names are used as field names.
    ///
    /// ```no_run
    /// use serde::Deserialize;
    /// # use sqlitekit::Connection;
    ///
    /// #[derive(Deserialize)]
    /// struct Article { article: String, amount: i64 }
    ///
    /// # let db = Connection::open_in_memory()?;
    /// let mut stmt = db.prepare("SELECT article, amount FROM store")?;
    /// for row in stmt.begin()? {
    ///     let item: Article = row?.deserialize()?;
    /// }
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}
