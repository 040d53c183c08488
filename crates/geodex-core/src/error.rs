//! Error types for geodex.

use thiserror::Error;

/// Result type alias using geodex's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for geodex operations.
///
/// Backend, normalization, and geocoding failures are recovered inside the
/// dispatcher and extractor respectively; they exist as distinct variants so
/// callers of the lower-level adapters can tell them apart.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied structural violation (bad bbox, out-of-range cap,
    /// unknown source selector). Surfaced immediately, never coerced.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed (wraps reqwest::Error)
    #[error("Request error: {0}")]
    Request(String),

    /// A catalog backend search call failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// A single upstream record could not be mapped to DatasetSummary
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Geocoding lookup failed or returned nothing usable
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// Authentication with a backend failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
