//! # Authentication Module
//!
//! Handles the operator session for the console.
//!
//! ## Components
//!
//! - [`SessionStore`] - Observable `{token, user}` record
//! - [`TokenStore`] - Durable token storage ([`FileTokenStore`], [`MemoryTokenStore`])
//! - [`Auth`] - Login, logout and profile loading

mod error;
mod login;
mod session;
mod storage;

pub use error::{AuthError, StorageError};
pub use login::Auth;
pub use session::{Session, SessionStore};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
