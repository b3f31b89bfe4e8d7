//! Error types for the schoolmiles library.
//!
//! Configuration and source errors fail fast before any querying; a rejected
//! distance query fails the whole run (a partial matrix is worse than none).

use thiserror::Error;

/// Main error type for schoolmiles operations
#[derive(Debug, Error)]
pub enum Error {
    /// Roster or snapshot source missing or corrupt
    #[error("address source unavailable: {0}")]
    SourceUnavailable(String),

    /// Neither an oracle credential nor cached data was supplied
    #[error("missing configuration: either an API key or a data file is required")]
    MissingApiKey,

    /// Neither a roster nor cached data was supplied
    #[error("missing configuration: either a roster file or a data file is required")]
    MissingRoster,

    /// The routing provider rejected an address pair
    #[error("distance query failed: {0}")]
    QueryFailed(String),

    /// Network connectivity issues (retried before surfacing)
    #[error("network error: {0}")]
    Network(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::Network(err.to_string())
        } else {
            Error::QueryFailed(err.to_string())
        }
    }
}

impl Error {
    /// Process exit code for this error class. Each class gets its own code
    /// so callers can tell a bad roster from a rejected query or a missing
    /// API key.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::SourceUnavailable(_) | Error::Io(_) => 1,
            Error::QueryFailed(_) | Error::Network(_) => 2,
            Error::MissingApiKey => 3,
            Error::MissingRoster => 4,
        }
    }
}

/// Convenience result type for schoolmiles operations
pub type Result<T> = std::result::Result<T, Error>;
