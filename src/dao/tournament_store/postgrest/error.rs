//! Error types shared by the PostgREST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`PostgrestError`] failures.
pub type PostgrestResult<T> = Result<T, PostgrestError>;

/// Failures that can occur while talking to the PostgREST endpoint.
#[derive(Debug, Error)]
pub enum PostgrestError {
    /// Required environment variable is missing.
    #[error("missing PostgREST environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build PostgREST client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table endpoint could not be sent.
    #[error("failed to send PostgREST request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with an unexpected status code.
    #[error("unexpected PostgREST response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be decoded into the expected rows.
    #[error("failed to decode PostgREST response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A row decoded but does not describe a valid record.
    #[error("invalid `{table}` row `{id}`: {reason}")]
    InvalidRow {
        table: &'static str,
        id: String,
        reason: String,
    },
}

impl From<PostgrestError> for StorageError {
    fn from(err: PostgrestError) -> Self {
        match err {
            PostgrestError::RequestStatus {
                status: StatusCode::CONFLICT,
                ..
            } => StorageError::Conflict(err.to_string()),
            PostgrestError::InvalidRow { .. } => StorageError::InvalidRecord(err.to_string()),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
