//! Error types for the qmind crate

use thiserror::Error;

/// Main error type for the qmind crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("line {line}: expected {expected} fields, got {got}")]
    FieldCount {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: field {field} has value '{value}' (expected {expected})")]
    InvalidField {
        line: usize,
        field: usize,
        value: String,
        expected: &'static str,
    },

    #[error("action ordinal {index} is out of range (must be 0-3)")]
    InvalidActionIndex { index: usize },

    #[error("distance bucket ordinal {index} is out of range (must be 0-2)")]
    InvalidDistanceBucket { index: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid world map: {message}")]
    InvalidWorldMap { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
