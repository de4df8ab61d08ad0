//! Core data model: typed columns, cell values, and the in-memory [`DataSet`].
//!
//! Every engine entry point takes a `&DataSet` and returns a new one. Rows are row-major and
//! positionally aligned with the [`Schema`]; a column that a source did not provide for some row
//! is stored as [`Value::Null`], and looking up a column the schema does not declare also yields
//! `Null`.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Logical data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date.
    Date,
}

impl DataType {
    /// `true` for `Int64` and `Float64`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name, unique within a dataset.
    pub name: String,
    /// Declared type used for comparisons and casting.
    pub data_type: DataType,
    /// Whether the column may hold nulls.
    pub nullable: bool,
}

impl Column {
    /// Create a new non-nullable column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
        }
    }

    /// Create a new nullable column.
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, data_type)
        }
    }
}

/// Ordered list of columns describing the shape of every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of columns.
    pub fields: Vec<Column>,
}

impl Schema {
    /// Create a new schema from columns.
    pub fn new(fields: Vec<Column>) -> Self {
        Self { fields }
    }

    /// Iterate column names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the column with the given name, if present.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single cell value.
///
/// Serialized untagged so that pipeline configuration reads naturally as JSON
/// (`"value": 10`, `"value": "west"`). Strings always deserialize as [`Value::Utf8`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for `Null` or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Utf8(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion used by comparison operators.
    ///
    /// Numbers map to themselves, booleans to `1`/`0`, strings to their trimmed parse, and dates
    /// to epoch milliseconds at midnight UTC. `Null`, empty and non-numeric strings yield `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => f64::NAN,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int64(v) => *v as f64,
            Value::Float64(v) => *v,
            Value::Utf8(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => f64::NAN,
            },
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis() as f64)
                .unwrap_or(f64::NAN),
        }
    }

    /// Numeric coercion used by aggregations and formulas: anything non-numeric becomes `0`.
    pub fn to_number_or_zero(&self) -> f64 {
        let v = self.to_number();
        if v.is_nan() { 0.0 } else { v }
    }

    /// Loose equality used by the `equals`/`not_equals` filter operators.
    ///
    /// `Null` equals only `Null`. When both sides coerce to finite numbers they compare
    /// numerically (so `"10" == 10` and `true == 1`); otherwise their display strings must match
    /// exactly.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            _ => {
                let (a, b) = (self.to_number(), other.to_number());
                if a.is_finite() && b.is_finite() {
                    a == b
                } else {
                    self.to_string() == other.to_string()
                }
            }
        }
    }

    /// Membership equality used by `in`/`not_in`: no coercion except that integers and floats
    /// are both plain numbers.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int64(a), Value::Float64(b)) | (Value::Float64(b), Value::Int64(a)) => {
                *a as f64 == *b
            }
            _ => self == other,
        }
    }
}

/// Display form used for string operators, grouping keys and generated column names.
///
/// `Null` displays as the empty string; integral floats display without a fractional part.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

static NULL: Value = Value::Null;

/// Reads the cell at `idx`, treating an unknown column or a short row as `Null`.
pub(crate) fn cell(row: &[Value], idx: Option<usize>) -> &Value {
    idx.and_then(|i| row.get(i)).unwrap_or(&NULL)
}

/// Where a dataset came from. Informational only; the engine never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Built in memory by the caller.
    #[default]
    Memory,
    /// Uploaded CSV file.
    Csv,
    /// JSON / NDJSON file.
    Json,
    /// Google Sheets fetch.
    GoogleSheets,
    /// BigQuery query result.
    BigQuery,
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Identifier; derived datasets carry a suffix such as `_filtered`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Source kind.
    pub source: SourceKind,
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
    /// When the source data was last refreshed.
    pub last_updated: Option<DateTime<Utc>>,
}

impl DataSet {
    /// Create an in-memory dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            source: SourceKind::Memory,
            schema,
            rows,
            last_updated: None,
        }
    }

    /// Set the dataset id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the dataset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the source kind.
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    /// Set the last-updated timestamp.
    pub fn with_last_updated(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Reads `column` from `row`; `Null` if the column is not part of the schema.
    pub fn value<'a>(&self, row: &'a [Value], column: &str) -> &'a Value {
        cell(row, self.schema.index_of(column))
    }

    /// Checks the structural contract every engine entry point relies on: unique column names
    /// and rows whose length matches the schema.
    pub fn validate(&self) -> EngineResult<()> {
        let mut seen = HashSet::with_capacity(self.schema.fields.len());
        for name in self.schema.field_names() {
            if !seen.insert(name) {
                return Err(EngineError::invalid_input(format!(
                    "dataset '{}' declares column '{name}' more than once",
                    self.id
                )));
            }
        }

        let expected = self.schema.fields.len();
        if let Some((idx, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(EngineError::invalid_input(format!(
                "dataset '{}' row {idx} has {} values but the schema declares {expected} columns",
                self.id,
                row.len()
            )));
        }
        Ok(())
    }

    /// A dataset with the same identity (id, name, source, timestamp) but new contents.
    pub fn derive(&self, schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            source: self.source,
            schema,
            rows,
            last_updated: self.last_updated,
        }
    }

    /// Create a new dataset containing only rows that match `predicate`, in their original order.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        self.derive(self.schema.clone(), rows)
    }

    /// Create a new dataset with `column` computed from every row by `mapper`.
    ///
    /// If a column of the same name exists it is replaced in place (keeping its position);
    /// otherwise the column is appended. Rows shorter than the schema are padded with `Null`
    /// first.
    pub fn with_column<F>(&self, column: Column, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Value,
    {
        let existing = self.schema.index_of(&column.name);
        let mut schema = self.schema.clone();
        match existing {
            Some(idx) => schema.fields[idx] = column,
            None => schema.fields.push(column),
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let computed = mapper(row.as_slice());
                let mut out = row.clone();
                if out.len() < self.schema.fields.len() {
                    out.resize(self.schema.fields.len(), Value::Null);
                }
                match existing {
                    Some(idx) => out[idx] = computed,
                    None => out.push(computed),
                }
                out
            })
            .collect();

        self.derive(schema, rows)
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }
}
