//! Probe Failure Types
//!
//! This module defines the vocabulary shared by every probe in the tester:
//! the closed [`ErrorKind`] taxonomy, the [`UsageContext`] a probe runs in,
//! the [`ProbeStep`] slots a failure is recorded against, and the immutable
//! [`ProbeFailure`] record itself.
//!
//! # Error Kinds
//!
//! Exactly one kind is assigned per failure. Kinds are mutually exclusive and
//! together cover every failure the probes can observe:
//!
//! | Kind                   | Produced by                                  |
//! |------------------------|----------------------------------------------|
//! | `cors`                 | classifier, CORS header check                |
//! | `cors_preflight`       | preflight check                              |
//! | `network`              | classifier (catch-all)                       |
//! | `tls_error`            | classifier                                   |
//! | `timeout`              | classifier                                   |
//! | `not_found`            | status check                                 |
//! | `server_error`         | status check                                 |
//! | `unknown`              | status check (other non-2xx)                 |
//! | `content_type`         | content-type check                           |
//! | `content_type_warning` | content-type check, support probe only       |
//! | `json_parse`           | body parse check                             |
//! | `invalid_response`     | shape check (body is not an object)          |
//! | `missing_field`        | shape check (required keys absent)           |
//!
//! # Messages
//!
//! `ProbeFailure::message` is a translation key, never display text. The UI
//! layer owns the catalogs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed taxonomy of probe failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request blocked by (or indistinguishable from) a CORS rejection
    Cors,
    /// CORS preflight request rejected
    CorsPreflight,
    /// Generic network failure (DNS, connection refused, reset)
    Network,
    /// TLS handshake or certificate validation failure
    TlsError,
    /// Body is not valid JSON
    JsonParse,
    /// Content-Type header missing or wrong
    ContentType,
    /// Content-Type mismatch tolerated as a warning
    ContentTypeWarning,
    /// HTTP 404
    NotFound,
    /// HTTP 5xx
    ServerError,
    /// Request aborted after the timeout elapsed
    Timeout,
    /// JSON body has the wrong top-level shape
    InvalidResponse,
    /// JSON body lacks required keys
    MissingField,
    /// Anything else (unexpected non-2xx status)
    Unknown,
}

impl ErrorKind {
    /// Every kind, in table order.
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::Cors,
        ErrorKind::CorsPreflight,
        ErrorKind::Network,
        ErrorKind::TlsError,
        ErrorKind::JsonParse,
        ErrorKind::ContentType,
        ErrorKind::ContentTypeWarning,
        ErrorKind::NotFound,
        ErrorKind::ServerError,
        ErrorKind::Timeout,
        ErrorKind::InvalidResponse,
        ErrorKind::MissingField,
        ErrorKind::Unknown,
    ];

    /// Number of kinds
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this kind in [`ErrorKind::ALL`]
    pub const fn index(self) -> usize {
        match self {
            ErrorKind::Cors => 0,
            ErrorKind::CorsPreflight => 1,
            ErrorKind::Network => 2,
            ErrorKind::TlsError => 3,
            ErrorKind::JsonParse => 4,
            ErrorKind::ContentType => 5,
            ErrorKind::ContentTypeWarning => 6,
            ErrorKind::NotFound => 7,
            ErrorKind::ServerError => 8,
            ErrorKind::Timeout => 9,
            ErrorKind::InvalidResponse => 10,
            ErrorKind::MissingField => 11,
            ErrorKind::Unknown => 12,
        }
    }

    /// Wire name, as serialized
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Cors => "cors",
            ErrorKind::CorsPreflight => "cors_preflight",
            ErrorKind::Network => "network",
            ErrorKind::TlsError => "tls_error",
            ErrorKind::JsonParse => "json_parse",
            ErrorKind::ContentType => "content_type",
            ErrorKind::ContentTypeWarning => "content_type_warning",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which probe produced a failure
///
/// The same [`ErrorKind`] gets different advice depending on the context:
/// a CORS failure while testing federation points at the tester's own
/// backend, not at the homeserver under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UsageContext {
    #[serde(rename = "support")]
    Support,
    #[serde(rename = "client-server")]
    ClientServer,
    #[serde(rename = "federation")]
    Federation,
    #[serde(rename = "wellknown")]
    WellKnown,
}

impl UsageContext {
    /// Every context, in table order.
    pub const ALL: [UsageContext; 4] = [
        UsageContext::Support,
        UsageContext::ClientServer,
        UsageContext::Federation,
        UsageContext::WellKnown,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub const fn index(self) -> usize {
        match self {
            UsageContext::Support => 0,
            UsageContext::ClientServer => 1,
            UsageContext::Federation => 2,
            UsageContext::WellKnown => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UsageContext::Support => "support",
            UsageContext::ClientServer => "client-server",
            UsageContext::Federation => "federation",
            UsageContext::WellKnown => "wellknown",
        }
    }
}

impl fmt::Display for UsageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot a failure is recorded against inside a probe sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStep {
    /// `/.well-known/matrix/client`
    WellKnown,
    /// `/_matrix/client/versions`
    Versions,
    /// `/.well-known/matrix/support`
    Support,
    /// Federation-report API call
    FederationReport,
    /// CORS preflight against the client-server API
    CorsPreflight,
}

impl ProbeStep {
    /// Remediation context for failures in this slot.
    ///
    /// A well-known failure is explained with well-known specific advice
    /// where the table has it; everything else uses the probe's context.
    pub const fn usage_context(self) -> UsageContext {
        match self {
            ProbeStep::WellKnown => UsageContext::WellKnown,
            ProbeStep::Versions | ProbeStep::CorsPreflight => UsageContext::ClientServer,
            ProbeStep::Support => UsageContext::Support,
            ProbeStep::FederationReport => UsageContext::Federation,
        }
    }
}

/// A fully classified probe failure
///
/// Constructed by the classifier or the validator and never mutated
/// afterwards; the `with_*` methods consume and return `self` so a failure is
/// complete before anyone else sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeFailure {
    kind: ErrorKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    technical_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_warning: bool,
}

impl ProbeFailure {
    /// Create a failure of `kind` with a translation key
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            technical_details: None,
            endpoint: None,
            http_status: None,
            response_headers: None,
            is_warning: false,
        }
    }

    /// Support-probe content-type mismatch, tolerated as a warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            is_warning: true,
            ..Self::new(ErrorKind::ContentTypeWarning, message)
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.technical_details = Some(details.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.response_headers = Some(headers);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn technical_details(&self) -> Option<&str> {
        self.technical_details.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn response_headers(&self) -> Option<&BTreeMap<String, String>> {
        self.response_headers.as_ref()
    }

    pub fn is_warning(&self) -> bool {
        self.is_warning
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(endpoint) = &self.endpoint {
            write!(f, " ({})", endpoint)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProbeFailure {}
