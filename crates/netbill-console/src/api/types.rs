//! # API Types
//!
//! Types for API requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A successful response.
///
/// The body is kept as raw JSON; resource records are opaque to the
/// client. An empty or non-JSON body is represented as [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Decoded JSON body.
    pub body: Value,
}

/// Credential exchange request.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Operator login.
    pub username: &'a str,
    /// Operator password.
    pub password: &'a str,
}

/// Credential exchange response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
}
