//! Core error types and user-facing error reporting.
//!
//! - [`CloudConfigError`] - errors from the project, state and command layers
//! - [`ErrorContext`] - an error plus a suggestion and details for CLI display
//! - [`user_friendly_error`] - convert any [`anyhow::Error`] into an [`ErrorContext`]

pub mod error;

pub use error::{CloudConfigError, ErrorContext, user_friendly_error};
