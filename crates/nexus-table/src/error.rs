//! Error types for the nexus-table crate.
//!
//! Engine operations never fail: bad filters degrade to "no match" and bad
//! bounds become no-ops. These errors surface only from the edges, where
//! configuration, stored preferences and record sources are read.

use thiserror::Error;

/// Errors that can occur outside the query pipeline itself.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be parsed or produced.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filter operator name is not recognized.
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    /// Sort direction name is not recognized.
    #[error("unknown sort direction '{0}' (expected 'asc' or 'desc')")]
    UnknownDirection(String),

    /// Configuration values are out of range.
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),

    /// A record source could not produce its snapshot.
    #[error("record source failed: {0}")]
    Source(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a record source error.
    pub fn source_failed(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }
}

/// Result type for nexus-table operations.
pub type Result<T> = std::result::Result<T, Error>;
