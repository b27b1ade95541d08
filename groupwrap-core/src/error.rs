//! Error types for groupwrap-core

use thiserror::Error;

/// Main error type for the groupwrap-core library
#[derive(Error, Debug)]
pub enum Error {
    /// The transcript had no non-empty lines to classify
    #[error("transcript is empty: no lines to classify")]
    EmptyInput,

    /// A message header carried a timestamp neither parser tier understood
    #[error("unrecognised timestamp {input:?}")]
    UnrecognizedTimestamp { input: String },

    /// An aggregate query found nothing to report
    #[error("aggregate {query} unavailable: {message}")]
    Aggregate { query: &'static str, message: String },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error fails the whole request.
    ///
    /// Only [`Error::Aggregate`] is soft: it drops one statistic or card
    /// candidate and the rest of the output is still produced.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Aggregate { .. })
    }
}

/// Result type alias for groupwrap-core
pub type Result<T> = std::result::Result<T, Error>;
