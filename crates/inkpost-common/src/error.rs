//! Unified error type for inkpost.
//!
//! Every stage of the image-ingestion pipeline funnels its failures into
//! [`Error`], which carries enough context for API handlers to derive an
//! HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in inkpost.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied input was rejected (bad URL, oversized payload, batch size).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The remote image could not be downloaded.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The payload is not one of the recognised image formats.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The payload has a recognised signature but is truncated or malformed.
    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "image").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A filesystem operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::NotFound { .. } => 404,
            Error::FetchFailed(_) => 502,
            Error::UnsupportedFormat(_) => 500,
            Error::CorruptFile(_) => 500,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Stable machine-readable name for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::FetchFailed(_) => "fetch_failed",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::CorruptFile(_) => "corrupt_file",
            Error::NotFound { .. } => "not_found",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Convenience constructor for [`Error::FetchFailed`].
    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Error::FetchFailed(msg.into())
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
