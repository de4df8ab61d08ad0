//! CSV ingestion implementation.

use std::path::Path;

use chrono::Utc;

use crate::error::{EngineError, EngineResult};
use crate::processing::parse_date;
use crate::types::{Column, DataSet, DataType, Schema, SourceKind, Value};

/// Ingest a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Each value is parsed according to the schema field type.
///
/// The dataset's `id` is the file stem, its `name` the file name.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> EngineResult<DataSet> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let ds = ingest_csv_from_reader(&mut rdr, schema)?;
    Ok(with_provenance(ds, path, SourceKind::Csv))
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> EngineResult<DataSet> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h.trim() == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(EngineError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest a CSV file whose schema is inferred from its contents (see [`infer_schema`]).
pub fn ingest_csv_inferred_from_path(path: impl AsRef<Path>) -> EngineResult<DataSet> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let ds = ingest_csv_inferred_from_reader(&mut rdr)?;
    Ok(with_provenance(ds, path, SourceKind::Csv))
}

/// Reads every record, infers a schema from the raw cells, then parses them with it.
pub fn ingest_csv_inferred_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> EngineResult<DataSet> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw_rows.push(
            (0..headers.len())
                .map(|i| record.get(i).unwrap_or("").to_string())
                .collect(),
        );
    }

    let schema = infer_schema(&headers, &raw_rows);
    let mut rows = Vec::with_capacity(raw_rows.len());
    for (row_idx0, raw) in raw_rows.iter().enumerate() {
        let user_row = row_idx0 + 2;
        let row = schema
            .fields
            .iter()
            .zip(raw)
            .map(|(field, cell)| parse_typed_value(user_row, &field.name, field.data_type, cell))
            .collect::<EngineResult<Vec<Value>>>()?;
        rows.push(row);
    }
    Ok(DataSet::new(schema, rows))
}

/// Picks the narrowest type every non-empty cell of a column satisfies, trying Bool, Int64,
/// Float64 and Date before falling back to Utf8. A column with an empty cell is nullable; a
/// column with no non-empty cells is nullable Utf8.
///
/// Date is only inferred when no cell carries a time of day, so timestamps stay Utf8 (the
/// pipeline's date steps still parse them).
pub fn infer_schema(headers: &[String], rows: &[Vec<String>]) -> Schema {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells: Vec<&str> = rows
                .iter()
                .map(|r| r.get(i).map_or("", |s| s.trim()))
                .collect();
            let present: Vec<&str> = cells.iter().copied().filter(|s| !s.is_empty()).collect();
            let nullable = present.len() < cells.len();

            let data_type = if present.is_empty() {
                DataType::Utf8
            } else if present.iter().all(|s| is_bool_literal(s)) {
                DataType::Bool
            } else if present.iter().all(|s| s.parse::<i64>().is_ok()) {
                DataType::Int64
            } else if present.iter().all(|s| s.parse::<f64>().is_ok_and(f64::is_finite)) {
                DataType::Float64
            } else if present.iter().all(|s| is_calendar_date(s)) {
                DataType::Date
            } else {
                DataType::Utf8
            };

            Column {
                name: name.clone(),
                data_type,
                nullable: nullable || present.is_empty(),
            }
        })
        .collect();
    Schema::new(fields)
}

pub(crate) fn with_provenance(ds: DataSet, path: &Path, source: SourceKind) -> DataSet {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    ds.with_id(stem)
        .with_name(name)
        .with_source(source)
        .with_last_updated(Utc::now())
}

fn parse_typed_value(row: usize, column: &str, data_type: DataType, raw: &str) -> EngineResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| EngineError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
        // A declared Date column keeps the calendar day of a timestamp.
        DataType::Date => parse_date(&Value::from(trimmed))
            .map(|dt| Value::Date(dt.date()))
            .ok_or_else(|| parse_error("expected a date (e.g. 2024-01-31)".to_string())),
    }
}

fn is_calendar_date(s: &str) -> bool {
    parse_date(&Value::from(s)).is_some_and(|dt| dt.date().and_hms_opt(0, 0, 0) == Some(dt))
}

fn is_bool_literal(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "true" | "false" | "yes" | "no")
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
