//! Error types shared by the widget components.

use reqwest::StatusCode;
use std::path::PathBuf;

/// Credential store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open credential store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Credential store schema is invalid: {0}")]
    Schema(#[source] rusqlite::Error),

    /// The id already holds a different token, or the token is bound to another id
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Credential store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Provider response body was not the JSON shape we expect.
#[derive(Debug, thiserror::Error)]
#[error("Malformed provider response: {0}")]
pub struct MalformedResponse(#[from] pub serde_json::Error);

/// Authorization code exchange failures.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Token exchange request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Token exchange rejected with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Token exchange response could not be decoded: {0}")]
    Malformed(#[from] MalformedResponse),

    #[error("Token exchange response is missing the access token or user id")]
    MissingToken,

    #[error("Failed to store credential: {0}")]
    Storage(#[from] StorageError),

    #[error("Credential store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Recent media listing failures.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Media request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Media request rejected with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Media response could not be decoded: {0}")]
    Malformed(#[from] MalformedResponse),

    #[error("Failed to load credential: {0}")]
    Storage(#[from] StorageError),

    #[error("Credential store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StorageError {
    /// Classify a rusqlite error, pulling constraint failures into their own variant.
    pub(crate) fn from_sqlite(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::ConstraintViolation(
                    msg.unwrap_or_else(|| "UNIQUE constraint failed".to_string()),
                )
            }
            other => StorageError::Sqlite(other),
        }
    }
}
