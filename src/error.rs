use thiserror::Error;

/// Convenience result type used across the crate.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type returned by ingestion, configuration loading, and the filter/transform entry points.
///
/// Data-shape problems inside a dataset (a bad formula, an unparsable date, an unknown operator)
/// never surface here; they degrade to `Null` or pass-through locally. Only caller contract
/// violations and I/O or decoding failures are reported.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error (pipeline configuration).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// The dataset handed to the engine is structurally invalid.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl EngineError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
