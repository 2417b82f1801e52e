//! # API Client
//!
//! HTTP client for communicating with the netbill backend.
//!
//! This module provides the [`ApiClient`] that every resource call goes
//! through. It attaches the session token, classifies failures into
//! [`ApiError`] and reports each one to the notification store before
//! handing it back to the caller.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use types::{ApiResponse, LoginRequest, LoginResponse};
