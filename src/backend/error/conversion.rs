/**
 * Error Conversion
 *
 * HTTP responses for backend errors and for panics caught by the
 * top-level error boundary.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 */

use crate::backend::error::types::BackendError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::any::Any;

/// Translation key of the generic crash page
pub const PANIC_MESSAGE: &str = "errors.somethingWentWrong";

/// Where the crash page sends the user
pub const HOME_LINK: &str = "/";

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Response for a panic inside a handler.
///
/// The panic payload is reported through `tracing` and never shown to the
/// user; they get a generic page with a way back home.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "Request handler panicked");

    let body = serde_json::json!({
        "error": PANIC_MESSAGE,
        "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        "home": HOME_LINK,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
