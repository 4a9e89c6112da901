/**
 * Backend Error Types
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Invalid requests: missing query parameters, malformed session ids.
 *
 * ## Config Errors
 *
 * A route whose configuration is missing, such as the federation routes
 * on a server started without an API base URL.
 *
 * ## Upstream
 *
 * The federation-report API itself failed while serving a pass-through
 * request such as `/api/stats`.
 */

use crate::shared::{ConfigError, ProbeFailure, SharedError};
use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use fedtester::backend::error::BackendError;
/// use fedtester::shared::ConfigError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "server_name is required");
/// let err: BackendError = ConfigError::MissingValue("api_server_url").into();
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing parameter, invalid header)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The upstream tester API failed
    #[error("Upstream error: {0}")]
    Upstream(ProbeFailure),

    /// Invalid user input
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// The route needs configuration this server does not have
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Upstream` - 502 Bad Gateway
    /// - `SharedError` - 400 Bad Request
    /// - `ConfigError` - 503 Service Unavailable
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::ConfigError(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Upstream(failure) => failure.to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::ConfigError(err) => err.to_string(),
        }
    }
}
