//! Ingestion entrypoints and implementations.
//!
//! Ingestion produces the [`crate::types::DataSet`] values the filter engine and the
//! transformation pipeline consume. Most callers should use [`ingest_from_path`] (from
//! [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - performs ingestion into an in-memory [`crate::types::DataSet`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`] (including schema inference for uploads)
//! - [`json`]

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, StdErrObserver,
};
pub use unified::{IngestionFormat, IngestionOptions, IngestionRequest, ingest_from_path, ingest_from_path_inferred};
