//! Error types for corpus loading and index maintenance.
//!
//! Matching itself has no failure modes: a query that finds nothing is a
//! "no match" result, not an error.

use thiserror::Error;

/// Result type alias using ResponderError
pub type Result<T> = std::result::Result<T, ResponderError>;

/// Failures while pulling corpus rows from a tabular source
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no corpus source configured")]
    MissingSource,

    #[error("HTTP error while fetching corpus: {0}")]
    Http(#[from] reqwest::Error),

    #[error("corpus source returned status {status}")]
    Status { status: u16 },

    #[error("I/O error while reading corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("corpus table needs at least 2 columns, found {found}")]
    TooFewColumns { found: usize },
}

/// Errors surfaced by the responder
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("corpus load failed: {0}")]
    Load(#[from] LoadError),

    #[error("snapshot I/O error: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    SnapshotCodec(#[from] serde_cbor::Error),

    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl From<::config::ConfigError> for ResponderError {
    fn from(err: ::config::ConfigError) -> Self {
        ResponderError::Config {
            message: err.to_string(),
        }
    }
}
