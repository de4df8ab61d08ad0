//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which ingests a file into an in-memory
//! [`crate::types::DataSet`] using a provided [`crate::types::Schema`]. Uploads without a
//! declared schema go through [`ingest_from_path_inferred`].
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::types::{DataSet, Schema};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row and column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ## CSV (auto-detect by extension)
///
/// ```no_run
/// use dashboard_data_engine::ingestion::{ingest_from_path, IngestionOptions};
/// use dashboard_data_engine::types::{Column, DataType, Schema};
///
/// # fn main() -> Result<(), dashboard_data_engine::EngineError> {
/// let schema = Schema::new(vec![
///     Column::new("region", DataType::Utf8),
///     Column::new("revenue", DataType::Float64),
/// ]);
///
/// let ds = ingest_from_path("sales.csv", &schema, &IngestionOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (stderr logging + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use dashboard_data_engine::ingestion::{
///     ingest_from_path, IngestionOptions, IngestionSeverity, StdErrObserver,
/// };
/// use dashboard_data_engine::types::{Column, DataType, Schema};
///
/// let schema = Schema::new(vec![Column::new("id", DataType::Int64)]);
///
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     alert_at_or_above: IngestionSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = ingest_from_path("does_not_exist.csv", &schema, &opts).unwrap_err();
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> EngineResult<DataSet> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let result = match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, schema),
        IngestionFormat::Json => json::ingest_json_from_path(path, schema),
    };
    report(path, fmt, options, &result);
    result
}

/// Like [`ingest_from_path`], but the schema is inferred from the file (see
/// [`csv::infer_schema`]). Only CSV supports inference; other formats fail with
/// [`EngineError::SchemaMismatch`].
pub fn ingest_from_path_inferred(path: impl AsRef<Path>, options: &IngestionOptions) -> EngineResult<DataSet> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let result = match fmt {
        IngestionFormat::Csv => csv::ingest_csv_inferred_from_path(path),
        other => Err(EngineError::SchemaMismatch {
            message: format!("schema inference is not supported for {other:?} input; provide a schema"),
        }),
    };
    report(path, fmt, options, &result);
    result
}

fn report(path: &Path, format: IngestionFormat, options: &IngestionOptions, result: &EngineResult<DataSet>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format,
    };
    match result {
        Ok(ds) => obs.on_success(
            &ctx,
            IngestionStats {
                rows: ds.row_count(),
                columns: ds.schema.fields.len(),
            },
        ),
        Err(e) => {
            let sev = IngestionSeverity::classify(e);
            obs.on_failure(&ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(&ctx, sev, e);
            }
        }
    }
}

fn infer_format_from_path(path: &Path) -> EngineResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| EngineError::SchemaMismatch {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| EngineError::SchemaMismatch {
        message: format!("cannot infer format from extension '{ext}' for path ({})", path.display()),
    })
}

/// Convenience helper for callers that want an owned request object.
///
/// Useful for queueing uploads in a job system.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Schema to validate/parse values into; `None` infers it.
    pub schema: Option<Schema>,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("schema_fields", &self.schema.as_ref().map(|s| s.fields.len()))
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Execute the request by calling [`ingest_from_path`] or [`ingest_from_path_inferred`].
    pub fn run(&self) -> EngineResult<DataSet> {
        match &self.schema {
            Some(schema) => ingest_from_path(&self.path, schema, &self.options),
            None => ingest_from_path_inferred(&self.path, &self.options),
        }
    }
}
