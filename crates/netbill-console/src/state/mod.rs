//! # Application State
//!
//! The state bundle handed to front ends.

mod app_state;

pub use app_state::AppState;
