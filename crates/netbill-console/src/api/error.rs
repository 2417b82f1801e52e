//! # API Errors
//!
//! Error types for API operations.

use thiserror::Error;

/// Errors that can occur during API operations.
///
/// Every failed request is classified into exactly one variant. Each
/// variant carries a human-readable message and a verbose `details` blob
/// (method, URL, status, payloads) for diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("server error: {status} - {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message parsed from the response, or the status text.
        message: String,
        /// Request/response trace.
        details: String,
    },

    /// The request was sent but no response arrived.
    #[error("network error: {message}")]
    Network {
        /// What went wrong on the wire.
        message: String,
        /// Request trace.
        details: String,
    },

    /// The request could not be constructed or sent at all.
    #[error("request error: {message}")]
    Client {
        /// Why the request could not be built.
        message: String,
        /// Request trace.
        details: String,
    },
}

impl ApiError {
    /// Short title suitable for a notification header.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Server { status, .. } => match status {
                400 => "Bad request",
                401 => "Unauthorized",
                403 => "Access denied",
                404 => "Not found",
                409 => "Conflict",
                422 => "Validation failed",
                500..=599 => "Server error",
                _ => "Request failed",
            },
            Self::Network { .. } => "Network error",
            Self::Client { .. } => "Request error",
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Server { message, .. }
            | Self::Network { message, .. }
            | Self::Client { message, .. } => message,
        }
    }

    /// Verbose diagnostic trace.
    #[must_use]
    pub fn details(&self) -> &str {
        match self {
            Self::Server { details, .. }
            | Self::Network { details, .. }
            | Self::Client { details, .. } => details,
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the backend rejected the credentials or token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
