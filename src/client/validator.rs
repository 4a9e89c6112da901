//! # Response Validator
//!
//! Pure checks over an already-fetched [`ProbeResponse`]. None of them
//! performs I/O; each returns the failure it found (or `None` / `Ok`).
//!
//! ## Checks
//!
//! - **Status**: 404 → `not_found`, ≥500 → `server_error`, other non-2xx →
//!   `unknown`
//! - **Content-Type**: missing or not containing the expected MIME type →
//!   `content_type`; in the support context a mismatch is only a
//!   `content_type_warning`
//! - **Body**: invalid JSON → `json_parse`
//! - **Shape**: not an object → `invalid_response`, required keys absent →
//!   `missing_field`
//! - **CORS** (emulated browser checks): missing allow-origin → `cors`,
//!   rejected preflight → `cors_preflight`
//!
//! [`validate_response`] runs status then content type and returns the first
//! failure. Body and shape checks are run separately by the caller once the
//! first two pass (or, for the support probe, once they pass with a warning).

use crate::client::http::ProbeResponse;
use crate::shared::{ErrorKind, ProbeFailure, UsageContext};
use serde_json::Value;

/// MIME type every Matrix JSON endpoint is expected to serve
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Characters of raw body quoted in a JSON parse failure
pub const BODY_SNIPPET_CHARS: usize = 200;

/// How a response should be validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// MIME type the Content-Type header must contain
    pub expected_content_type: &'static str,
    /// Which probe is validating; `Support` tolerates content-type mismatches
    pub context: UsageContext,
}

impl ValidationOptions {
    pub fn new(context: UsageContext) -> Self {
        Self {
            expected_content_type: JSON_CONTENT_TYPE,
            context,
        }
    }

    pub fn expecting(mut self, content_type: &'static str) -> Self {
        self.expected_content_type = content_type;
        self
    }
}

/// Status check
pub fn check_status(response: &ProbeResponse) -> Option<ProbeFailure> {
    if response.is_success() {
        return None;
    }

    let failure = match response.status {
        404 => ProbeFailure::new(ErrorKind::NotFound, "errors.notFound"),
        status if status >= 500 => {
            let details = if response.body.trim().is_empty() {
                format!("Server returned HTTP {}", status)
            } else {
                response.body.clone()
            };
            ProbeFailure::new(ErrorKind::ServerError, "errors.serverError").with_details(details)
        }
        status => ProbeFailure::new(ErrorKind::Unknown, "errors.unexpectedStatus")
            .with_details(format!("Unexpected HTTP status {}", status)),
    };

    Some(attach_response(failure, response))
}

/// Content-Type check
pub fn check_content_type(
    response: &ProbeResponse,
    options: &ValidationOptions,
) -> Option<ProbeFailure> {
    let expected = options.expected_content_type;
    let actual = match response.content_type().map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => {
            let failure = ProbeFailure::new(ErrorKind::ContentType, "errors.missingContentType")
                .with_details(format!("Expected {} but no Content-Type header was sent", expected));
            return Some(attach_response(failure, response));
        }
    };

    if actual.to_ascii_lowercase().contains(&expected.to_ascii_lowercase()) {
        return None;
    }

    let details = format!("Expected {} but received {}", expected, actual);
    let failure = if options.context == UsageContext::Support {
        ProbeFailure::warning("errors.contentTypeWarning").with_details(details)
    } else {
        ProbeFailure::new(ErrorKind::ContentType, "errors.wrongContentType").with_details(details)
    };
    Some(attach_response(failure, response))
}

/// Status then content type; the first failure wins
pub fn validate_response(
    response: &ProbeResponse,
    options: &ValidationOptions,
) -> Option<ProbeFailure> {
    check_status(response).or_else(|| check_content_type(response, options))
}

/// Parse the body as JSON
pub fn parse_json_body(response: &ProbeResponse) -> Result<Value, ProbeFailure> {
    serde_json::from_str(&response.body).map_err(|err| {
        let snippet: String = response.body.chars().take(BODY_SNIPPET_CHARS).collect();
        ProbeFailure::new(ErrorKind::JsonParse, "errors.jsonParse")
            .with_details(format!("{}. Response body starts with: {}", err, snippet))
            .with_endpoint(response.url.clone())
            .with_status(response.status)
    })
}

/// Check that `value` is an object with every `required` key path present.
///
/// Each required entry is a path of object keys; keys may themselves contain
/// dots (`["m.homeserver", "base_url"]`). Missing paths are named in the
/// failure joined with `.`.
pub fn check_shape(
    value: &Value,
    required: &[&[&str]],
    endpoint: &str,
) -> Option<ProbeFailure> {
    if !value.is_object() {
        return Some(
            ProbeFailure::new(ErrorKind::InvalidResponse, "errors.invalidResponse")
                .with_details(format!("Expected a JSON object, got {}", json_type_name(value)))
                .with_endpoint(endpoint),
        );
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|path| lookup_path(value, path).map_or(true, Value::is_null))
        .map(|path| path.join("."))
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(
            ProbeFailure::new(ErrorKind::MissingField, "errors.missingField")
                .with_details(format!("Missing required fields: {}", missing.join(", ")))
                .with_endpoint(endpoint),
        )
    }
}

/// Follow a key path through nested objects
pub fn lookup_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Emulated browser check: a cross-origin GET needs an allow-origin header
pub fn check_cors(response: &ProbeResponse) -> Option<ProbeFailure> {
    match response.header("access-control-allow-origin") {
        Some(origin) if !origin.trim().is_empty() => None,
        _ => Some(attach_response(
            ProbeFailure::new(ErrorKind::Cors, "errors.corsMissingHeader").with_details(
                "Response has no Access-Control-Allow-Origin header; browsers will block it",
            ),
            response,
        )),
    }
}

/// Emulated browser check: the preflight must succeed, allow an origin and
/// allow GET
pub fn check_preflight(response: &ProbeResponse) -> Option<ProbeFailure> {
    let problem = if !response.is_success() {
        Some(format!("Preflight answered HTTP {}", response.status))
    } else if response
        .header("access-control-allow-origin")
        .map_or(true, |v| v.trim().is_empty())
    {
        Some("Preflight response has no Access-Control-Allow-Origin header".to_string())
    } else {
        match response.header("access-control-allow-methods") {
            Some(methods)
                if !methods
                    .split(',')
                    .any(|m| m.trim() == "*" || m.trim().eq_ignore_ascii_case("GET")) =>
            {
                Some(format!("Preflight does not allow GET (allowed: {})", methods))
            }
            _ => None,
        }
    };

    problem.map(|details| {
        attach_response(
            ProbeFailure::new(ErrorKind::CorsPreflight, "errors.corsPreflight").with_details(details),
            response,
        )
    })
}

fn attach_response(failure: ProbeFailure, response: &ProbeResponse) -> ProbeFailure {
    failure
        .with_endpoint(response.url.clone())
        .with_status(response.status)
        .with_headers(response.headers.clone())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
