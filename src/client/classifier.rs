//! # Transport Failure Classifier
//!
//! Maps an opaque low-level transport failure (one that produced no HTTP
//! response at all) onto one of four coarse [`ErrorKind`]s.
//!
//! Transport stacks collapse CORS rejections, DNS failures and refused
//! connections into the same error type, leaving only the message text to
//! tell them apart. Classification is therefore best-effort text sniffing
//! driven by [`RULES`], evaluated top to bottom, first match wins:
//!
//! | # | Rule                                              | Kind        |
//! |---|---------------------------------------------------|-------------|
//! | 1 | request aborted / timed out                       | `timeout`   |
//! | 2 | message mentions TLS / certificate vocabulary     | `tls_error` |
//! | 3 | fetch-layer error mentioning CORS / network       | `cors`      |
//! | 4 | anything else                                     | `network`   |
//!
//! TLS is checked before CORS because certificate failures frequently also
//! surface as generic fetch errors. Some DNS failures mention "network" and
//! land in `cors`; that is a known limitation of the heuristic and is kept
//! as-is.

use crate::shared::{ErrorKind, ProbeFailure};

/// Case-insensitive substrings that identify certificate / TLS failures
pub const TLS_VOCABULARY: &[&str] = &[
    "tls error",
    "certificate",
    "unknownissuer",
    "unknown issuer",
    "self-signed",
    "cert",
    "ssl",
];

/// Case-insensitive substrings that identify CORS / generic fetch failures
pub const CORS_VOCABULARY: &[&str] = &["cors", "network", "failed to fetch"];

/// A transport failure reduced to the facts the rules look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// The request was aborted because its timeout elapsed
    pub aborted: bool,
    /// The failure came from the fetch layer itself (request could not be
    /// sent or connection could not be established)
    pub fetch_layer: bool,
    /// Full error text, source chain included, without the request URL
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            aborted: false,
            fetch_layer: false,
            message: message.into(),
        }
    }

    pub fn aborted(mut self) -> Self {
        self.aborted = true;
        self
    }

    pub fn fetch_layer(mut self) -> Self {
        self.fetch_layer = true;
        self
    }

    /// Reduce a `reqwest` error.
    ///
    /// The URL is stripped before the message is built so that a server
    /// name like `network.example` cannot steer classification.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let aborted = err.is_timeout();
        let fetch_layer = err.is_connect() || err.is_request();
        let err = err.without_url();

        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            aborted,
            fetch_layer,
            message,
        }
    }
}

/// Condition half of a classification rule
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// The request was aborted
    Aborted,
    /// The message contains any of the substrings
    MessageContains(&'static [&'static str]),
    /// A fetch-layer failure whose message contains any of the substrings
    FetchLayerMessageContains(&'static [&'static str]),
    /// Matches everything
    Always,
}

impl Matcher {
    fn matches(&self, failure: &TransportFailure, lowered: &str) -> bool {
        match self {
            Matcher::Aborted => failure.aborted,
            Matcher::MessageContains(needles) => contains_any(lowered, needles),
            Matcher::FetchLayerMessageContains(needles) => {
                failure.fetch_layer && contains_any(lowered, needles)
            }
            Matcher::Always => true,
        }
    }
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub matcher: Matcher,
    pub kind: ErrorKind,
}

/// Classification table, in priority order
pub const RULES: [Rule; 4] = [
    Rule {
        matcher: Matcher::Aborted,
        kind: ErrorKind::Timeout,
    },
    Rule {
        matcher: Matcher::MessageContains(TLS_VOCABULARY),
        kind: ErrorKind::TlsError,
    },
    Rule {
        matcher: Matcher::FetchLayerMessageContains(CORS_VOCABULARY),
        kind: ErrorKind::Cors,
    },
    Rule {
        matcher: Matcher::Always,
        kind: ErrorKind::Network,
    },
];

/// Classify a transport failure
pub fn classify(failure: &TransportFailure) -> ErrorKind {
    let lowered = failure.message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matcher.matches(failure, &lowered))
        .map(|rule| rule.kind)
        .unwrap_or(ErrorKind::Network)
}

/// Translation key for a transport-level failure of `kind`
pub fn transport_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Timeout => "errors.timeout",
        ErrorKind::TlsError => "errors.tlsError",
        ErrorKind::Cors => "errors.cors",
        _ => "errors.network",
    }
}

/// Classify and build the complete failure record for `endpoint`
pub fn classify_failure(failure: &TransportFailure, endpoint: &str) -> ProbeFailure {
    let kind = classify(failure);
    tracing::warn!(endpoint, %kind, "Probe failed before a response: {}", failure.message);
    ProbeFailure::new(kind, transport_message(kind))
        .with_details(failure.message.clone())
        .with_endpoint(endpoint)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
