//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested fields are supported using dot paths in schema field names (e.g. `user.name`).
//! A field absent from an object reads as `Null` when its column is nullable.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::processing::parse_date;
use crate::types::{DataSet, DataType, Schema, SourceKind, Value};

use super::csv::with_provenance;

/// Ingest JSON into an in-memory `DataSet`.
pub fn ingest_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> EngineResult<DataSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let ds = ingest_json_from_str(&text, schema)?;
    Ok(with_provenance(ds, path, SourceKind::Json))
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, schema: &Schema) -> EngineResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EngineError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => ingest_json_values(&items, schema),
            serde_json::Value::Object(_) => ingest_json_values(std::slice::from_ref(&v), schema),
            _ => Err(EngineError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| EngineError::SchemaMismatch {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            })?;
            values.push(v);
        }
        ingest_json_values(&values, schema)
    }
}

fn ingest_json_values(values: &[serde_json::Value], schema: &Schema) -> EngineResult<DataSet> {
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| EngineError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            match get_by_dot_path(obj, &field.name) {
                Some(jv) => row.push(convert_json_value(row_num, &field.name, field.data_type, jv)?),
                None if field.nullable => row.push(Value::Null),
                None => {
                    return Err(EngineError::SchemaMismatch {
                        message: format!("row {row_num} missing required field '{}'", field.name),
                    });
                }
            }
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn get_by_dot_path<'a>(
    root: &'a serde_json::Map<String, serde_json::Value>,
    path: &str,
) -> Option<&'a serde_json::Value> {
    // A literal key wins over a nested lookup.
    if let Some(v) = root.get(path) {
        return Some(v);
    }

    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        match current {
            serde_json::Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn convert_json_value(row: usize, column: &str, data_type: DataType, v: &serde_json::Value) -> EngineResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    let parse_error = |message: &str| EngineError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Utf8 => match v {
            serde_json::Value::String(s) => Ok(Value::Utf8(s.clone())),
            serde_json::Value::Number(_) | serde_json::Value::Bool(_) => Ok(Value::Utf8(v.to_string())),
            _ => Err(parse_error("expected string")),
        },
        DataType::Bool => v.as_bool().map(Value::Bool).ok_or_else(|| parse_error("expected bool")),
        DataType::Int64 => {
            if let Some(n) = v.as_i64() {
                Ok(Value::Int64(n))
            } else if let Some(n) = v.as_u64() {
                i64::try_from(n)
                    .map(Value::Int64)
                    .map_err(|_| parse_error("u64 out of range for i64"))
            } else {
                Err(parse_error("expected integer number"))
            }
        }
        DataType::Float64 => v.as_f64().map(Value::Float64).ok_or_else(|| parse_error("expected number")),
        DataType::Date => {
            let candidate = match v {
                serde_json::Value::String(s) => Value::Utf8(s.clone()),
                serde_json::Value::Number(n) => n.as_i64().map_or(Value::Null, Value::Int64),
                _ => Value::Null,
            };
            parse_date(&candidate)
                .map(|dt| Value::Date(dt.date()))
                .ok_or_else(|| parse_error("expected a date string or epoch milliseconds"))
        }
    }
}
