//! Input errors
//!
//! Probe failures are not errors in this sense: they are data
//! ([`crate::shared::ProbeFailure`]) that ends up in the UI. `SharedError`
//! covers input the crate refuses to probe at all, such as a malformed
//! server name.
//!
//! ```rust
//! use fedtester::shared::error::SharedError;
//!
//! let error = SharedError::validation("server_name", "Server name cannot be empty");
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A user-supplied value was rejected
    #[error("Validation error in field '{field}': {message}")]
    ValidationError { field: String, message: String },
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
