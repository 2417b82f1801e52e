//! Error types for authentication and token storage.

use thiserror::Error;

use crate::api::ApiError;

/// Errors from durable token storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the token file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The token file is not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that can occur while logging in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential exchange request failed.
    #[error("login rejected: {0}")]
    Rejected(#[from] ApiError),

    /// The backend accepted the request but returned no token.
    #[error("login response did not contain a token")]
    MissingToken,

    /// The token could not be persisted.
    #[error("failed to store token: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// The underlying API error, if the request itself failed.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }
}
