//! Error types for ambient data handling.

use thiserror::Error;

pub type AmbientResult<T> = Result<T, AmbientError>;

/// Errors raised while building a series from raw feed data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmbientError {
    #[error("Series length mismatch: {times} timestamps, {values} values")]
    LengthMismatch { times: usize, values: usize },

    #[error("Unparsable timestamp: {value}")]
    BadTimestamp { value: String },

    #[error("Non-finite sample at index {index}")]
    NonFinite { index: usize },
}

/// Errors returned by a feed. The estimator never propagates these; a failed
/// fetch keeps the previous series.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed series: {0}")]
    Malformed(#[from] AmbientError),

    #[error("Feed unavailable: {what}")]
    Unavailable { what: String },
}
