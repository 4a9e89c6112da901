//! Remediation catalog
//!
//! Maps every (`ErrorKind`, `UsageContext`) pair to a [`RemediationScript`]:
//! a title, a description, ordered steps, and optionally a technical note, a
//! documentation link and a "learn more" key. All text fields are
//! translation keys.
//!
//! The catalog is a static table with one row per [`ErrorKind`] (in
//! [`ErrorKind::ALL`] order) and one column per [`UsageContext`] (in
//! [`UsageContext::ALL`] order), so [`resolve`] is total by construction.
//!
//! # Context-dependent rows
//!
//! | Kind        | support / client-server      | federation              | wellknown              |
//! |-------------|------------------------------|-------------------------|------------------------|
//! | `cors`      | homeserver CORS config       | tester backend config   | well-known file CORS   |
//! | `tls_error` | homeserver certificate       | tester backend cert     | delegation domain cert |
//! | `network`   | homeserver reachability      | tester backend reach    | delegation domain      |
//! | `not_found` | per-endpoint                 | report endpoint         | missing well-known     |
//!
//! Federation probing happens server-side, so a CORS failure in the
//! federation context can only be the tester's own API misbehaving.
//!
//! Kinds without a dedicated row (`invalid_response`, `missing_field`,
//! `unknown`) fall back to the well-known script in the `wellknown` context
//! and to the generic unknown-error script everywhere else.
//!
//! # Example
//!
//! ```rust
//! use fedtester::client::remediation::resolve;
//! use fedtester::shared::{ErrorKind, UsageContext};
//!
//! let script = resolve(ErrorKind::Cors, UsageContext::Federation);
//! for step in script.steps {
//!     println!("  - {}", step);
//! }
//! ```

use crate::shared::{ErrorKind, ProbeFailure, UsageContext};
use serde::Serialize;

/// A remediation script shown next to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationScript {
    /// Stable identifier of the script
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Ordered remediation steps; never empty
    pub steps: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_note: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_link: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learn_more_key: Option<&'static str>,
}

// =========================================================================
// CORS
// =========================================================================

const CORS_HOMESERVER: RemediationScript = RemediationScript {
    id: "cors.homeserver",
    title: "solutions.cors.homeserver.title",
    description: "solutions.cors.homeserver.description",
    steps: &[
        "solutions.cors.homeserver.steps.allowOrigin",
        "solutions.cors.homeserver.steps.allowMethods",
        "solutions.cors.homeserver.steps.allowHeaders",
        "solutions.cors.homeserver.steps.checkReverseProxy",
        "solutions.common.steps.retest",
    ],
    technical_note: Some("solutions.cors.homeserver.technicalNote"),
    docs_link: Some("/docs/cors"),
    learn_more_key: Some("solutions.cors.learnMore"),
};

const CORS_BACKEND: RemediationScript = RemediationScript {
    id: "cors.backend",
    title: "solutions.cors.backend.title",
    description: "solutions.cors.backend.description",
    steps: &[
        "solutions.cors.backend.steps.checkApiCors",
        "solutions.cors.backend.steps.checkApiUrl",
        "solutions.common.steps.contactOperator",
    ],
    technical_note: Some("solutions.cors.backend.technicalNote"),
    docs_link: None,
    learn_more_key: None,
};

const CORS_WELLKNOWN: RemediationScript = RemediationScript {
    id: "cors.wellknown",
    title: "solutions.cors.wellknown.title",
    description: "solutions.cors.wellknown.description",
    steps: &[
        "solutions.cors.wellknown.steps.addHeaderToWellKnown",
        "solutions.cors.wellknown.steps.checkStaticHost",
        "solutions.common.steps.retest",
    ],
    technical_note: Some("solutions.cors.wellknown.technicalNote"),
    docs_link: Some("/docs/well-known"),
    learn_more_key: Some("solutions.cors.learnMore"),
};

const CORS_PREFLIGHT: RemediationScript = RemediationScript {
    id: "cors_preflight",
    title: "solutions.corsPreflight.title",
    description: "solutions.corsPreflight.description",
    steps: &[
        "solutions.corsPreflight.steps.answerOptions",
        "solutions.corsPreflight.steps.allowGet",
        "solutions.corsPreflight.steps.allowAuthorizationHeader",
        "solutions.common.steps.retest",
    ],
    technical_note: Some("solutions.corsPreflight.technicalNote"),
    docs_link: Some("/docs/cors"),
    learn_more_key: Some("solutions.cors.learnMore"),
};

// =========================================================================
// Network / TLS / timeout
// =========================================================================

const NETWORK_HOMESERVER: RemediationScript = RemediationScript {
    id: "network.homeserver",
    title: "solutions.network.homeserver.title",
    description: "solutions.network.homeserver.description",
    steps: &[
        "solutions.network.homeserver.steps.checkDns",
        "solutions.network.homeserver.steps.checkServerRunning",
        "solutions.network.homeserver.steps.checkFirewall",
        "solutions.network.homeserver.steps.checkPort",
    ],
    technical_note: Some("solutions.network.homeserver.technicalNote"),
    docs_link: Some("/docs/network"),
    learn_more_key: None,
};

const NETWORK_BACKEND: RemediationScript = RemediationScript {
    id: "network.backend",
    title: "solutions.network.backend.title",
    description: "solutions.network.backend.description",
    steps: &[
        "solutions.network.backend.steps.checkOwnConnection",
        "solutions.network.backend.steps.checkApiStatus",
        "solutions.common.steps.retryLater",
    ],
    technical_note: None,
    docs_link: None,
    learn_more_key: None,
};

const NETWORK_WELLKNOWN: RemediationScript = RemediationScript {
    id: "network.wellknown",
    title: "solutions.network.wellknown.title",
    description: "solutions.network.wellknown.description",
    steps: &[
        "solutions.network.wellknown.steps.checkDomainResolves",
        "solutions.network.wellknown.steps.checkWebServer",
        "solutions.network.wellknown.steps.checkHttps",
    ],
    technical_note: None,
    docs_link: Some("/docs/well-known"),
    learn_more_key: None,
};

const TLS_HOMESERVER: RemediationScript = RemediationScript {
    id: "tls_error.homeserver",
    title: "solutions.tls.homeserver.title",
    description: "solutions.tls.homeserver.description",
    steps: &[
        "solutions.tls.homeserver.steps.checkExpiry",
        "solutions.tls.homeserver.steps.checkChain",
        "solutions.tls.homeserver.steps.checkHostname",
        "solutions.tls.homeserver.steps.avoidSelfSigned",
    ],
    technical_note: Some("solutions.tls.homeserver.technicalNote"),
    docs_link: Some("/docs/tls"),
    learn_more_key: Some("solutions.tls.learnMore"),
};

const TLS_BACKEND: RemediationScript = RemediationScript {
    id: "tls_error.backend",
    title: "solutions.tls.backend.title",
    description: "solutions.tls.backend.description",
    steps: &[
        "solutions.tls.backend.steps.checkApiCertificate",
        "solutions.common.steps.contactOperator",
    ],
    technical_note: None,
    docs_link: None,
    learn_more_key: None,
};

const TLS_WELLKNOWN: RemediationScript = RemediationScript {
    id: "tls_error.wellknown",
    title: "solutions.tls.wellknown.title",
    description: "solutions.tls.wellknown.description",
    steps: &[
        "solutions.tls.wellknown.steps.checkDelegationCertificate",
        "solutions.tls.homeserver.steps.checkChain",
        "solutions.tls.homeserver.steps.checkHostname",
    ],
    technical_note: Some("solutions.tls.wellknown.technicalNote"),
    docs_link: Some("/docs/tls"),
    learn_more_key: Some("solutions.tls.learnMore"),
};

const TIMEOUT: RemediationScript = RemediationScript {
    id: "timeout",
    title: "solutions.timeout.title",
    description: "solutions.timeout.description",
    steps: &[
        "solutions.timeout.steps.checkServerLoad",
        "solutions.timeout.steps.checkFirewallDrops",
        "solutions.common.steps.retryLater",
    ],
    technical_note: Some("solutions.timeout.technicalNote"),
    docs_link: None,
    learn_more_key: None,
};

// =========================================================================
// Response content
// =========================================================================

const JSON_PARSE: RemediationScript = RemediationScript {
    id: "json_parse",
    title: "solutions.jsonParse.title",
    description: "solutions.jsonParse.description",
    steps: &[
        "solutions.jsonParse.steps.validateJson",
        "solutions.jsonParse.steps.checkErrorPage",
        "solutions.jsonParse.steps.checkEncoding",
    ],
    technical_note: Some("solutions.jsonParse.technicalNote"),
    docs_link: None,
    learn_more_key: None,
};

const CONTENT_TYPE: RemediationScript = RemediationScript {
    id: "content_type",
    title: "solutions.contentType.title",
    description: "solutions.contentType.description",
    steps: &[
        "solutions.contentType.steps.setJsonType",
        "solutions.contentType.steps.checkWebServerMime",
        "solutions.common.steps.retest",
    ],
    technical_note: Some("solutions.contentType.technicalNote"),
    docs_link: Some("/docs/content-type"),
    learn_more_key: None,
};

const CONTENT_TYPE_WARNING: RemediationScript = RemediationScript {
    id: "content_type_warning",
    title: "solutions.contentTypeWarning.title",
    description: "solutions.contentTypeWarning.description",
    steps: &[
        "solutions.contentTypeWarning.steps.preferJsonType",
        "solutions.contentType.steps.checkWebServerMime",
    ],
    technical_note: Some("solutions.contentTypeWarning.technicalNote"),
    docs_link: Some("/docs/content-type"),
    learn_more_key: None,
};

const SERVER_ERROR: RemediationScript = RemediationScript {
    id: "server_error",
    title: "solutions.serverError.title",
    description: "solutions.serverError.description",
    steps: &[
        "solutions.serverError.steps.checkLogs",
        "solutions.serverError.steps.checkUpstream",
        "solutions.serverError.steps.restartService",
    ],
    technical_note: None,
    docs_link: None,
    learn_more_key: None,
};

// =========================================================================
// Not found
// =========================================================================

const NOT_FOUND_SUPPORT: RemediationScript = RemediationScript {
    id: "not_found.support",
    title: "solutions.notFound.support.title",
    description: "solutions.notFound.support.description",
    steps: &[
        "solutions.notFound.support.steps.createSupportFile",
        "solutions.notFound.support.steps.addContacts",
    ],
    technical_note: Some("solutions.notFound.support.technicalNote"),
    docs_link: Some("/docs/support-file"),
    learn_more_key: None,
};

const NOT_FOUND_CLIENT_SERVER: RemediationScript = RemediationScript {
    id: "not_found.client_server",
    title: "solutions.notFound.clientServer.title",
    description: "solutions.notFound.clientServer.description",
    steps: &[
        "solutions.notFound.clientServer.steps.checkBaseUrl",
        "solutions.notFound.clientServer.steps.checkProxyRoutes",
        "solutions.common.steps.retest",
    ],
    technical_note: None,
    docs_link: Some("/docs/client-server"),
    learn_more_key: None,
};

const NOT_FOUND_FEDERATION: RemediationScript = RemediationScript {
    id: "not_found.federation",
    title: "solutions.notFound.federation.title",
    description: "solutions.notFound.federation.description",
    steps: &[
        "solutions.notFound.federation.steps.checkServerName",
        "solutions.notFound.federation.steps.checkApiVersion",
    ],
    technical_note: None,
    docs_link: None,
    learn_more_key: None,
};

const NOT_FOUND_WELLKNOWN: RemediationScript = RemediationScript {
    id: "not_found.wellknown",
    title: "solutions.notFound.wellknown.title",
    description: "solutions.notFound.wellknown.description",
    steps: &[
        "solutions.notFound.wellknown.steps.createClientFile",
        "solutions.notFound.wellknown.steps.checkPath",
        "solutions.notFound.wellknown.steps.checkRedirects",
    ],
    technical_note: Some("solutions.notFound.wellknown.technicalNote"),
    docs_link: Some("/docs/well-known"),
    learn_more_key: Some("solutions.wellknown.learnMore"),
};

// =========================================================================
// Fallbacks
// =========================================================================

const WELLKNOWN_GENERIC: RemediationScript = RemediationScript {
    id: "wellknown",
    title: "solutions.wellknown.title",
    description: "solutions.wellknown.description",
    steps: &[
        "solutions.wellknown.steps.checkFormat",
        "solutions.wellknown.steps.checkBaseUrl",
        "solutions.jsonParse.steps.validateJson",
    ],
    technical_note: Some("solutions.wellknown.technicalNote"),
    docs_link: Some("/docs/well-known"),
    learn_more_key: Some("solutions.wellknown.learnMore"),
};

const UNKNOWN: RemediationScript = RemediationScript {
    id: "unknown",
    title: "solutions.unknown.title",
    description: "solutions.unknown.description",
    steps: &[
        "solutions.common.steps.retryLater",
        "solutions.serverError.steps.checkLogs",
        "solutions.unknown.steps.reportIssue",
    ],
    technical_note: None,
    docs_link: None,
    learn_more_key: None,
};

/// Rows follow [`ErrorKind::ALL`]; columns are support, client-server,
/// federation, wellknown.
static CATALOG: [[&RemediationScript; UsageContext::COUNT]; ErrorKind::COUNT] = [
    // cors
    [&CORS_HOMESERVER, &CORS_HOMESERVER, &CORS_BACKEND, &CORS_WELLKNOWN],
    // cors_preflight
    [&CORS_PREFLIGHT, &CORS_PREFLIGHT, &CORS_BACKEND, &CORS_PREFLIGHT],
    // network
    [&NETWORK_HOMESERVER, &NETWORK_HOMESERVER, &NETWORK_BACKEND, &NETWORK_WELLKNOWN],
    // tls_error
    [&TLS_HOMESERVER, &TLS_HOMESERVER, &TLS_BACKEND, &TLS_WELLKNOWN],
    // json_parse
    [&JSON_PARSE, &JSON_PARSE, &JSON_PARSE, &JSON_PARSE],
    // content_type
    [&CONTENT_TYPE, &CONTENT_TYPE, &CONTENT_TYPE, &CONTENT_TYPE],
    // content_type_warning
    [&CONTENT_TYPE_WARNING, &CONTENT_TYPE_WARNING, &CONTENT_TYPE_WARNING, &CONTENT_TYPE_WARNING],
    // not_found
    [&NOT_FOUND_SUPPORT, &NOT_FOUND_CLIENT_SERVER, &NOT_FOUND_FEDERATION, &NOT_FOUND_WELLKNOWN],
    // server_error
    [&SERVER_ERROR, &SERVER_ERROR, &SERVER_ERROR, &SERVER_ERROR],
    // timeout
    [&TIMEOUT, &TIMEOUT, &TIMEOUT, &TIMEOUT],
    // invalid_response
    [&UNKNOWN, &UNKNOWN, &UNKNOWN, &WELLKNOWN_GENERIC],
    // missing_field
    [&UNKNOWN, &UNKNOWN, &UNKNOWN, &WELLKNOWN_GENERIC],
    // unknown
    [&UNKNOWN, &UNKNOWN, &UNKNOWN, &WELLKNOWN_GENERIC],
];

/// Look up the remediation script for a failure kind in a context
pub fn resolve(kind: ErrorKind, context: UsageContext) -> &'static RemediationScript {
    CATALOG[kind.index()][context.index()]
}

/// Remediation for a concrete failure
pub fn resolve_failure(failure: &ProbeFailure, context: UsageContext) -> &'static RemediationScript {
    resolve(failure.kind(), context)
}

/// Whether a documentation page is published for `link`.
///
/// No pages are published yet.
pub fn has_documentation(_link: &str) -> bool {
    false
}

/// How a script's documentation link should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "link", rename_all = "snake_case")]
pub enum DocsLinkState {
    /// No link at all
    None,
    /// Published page
    Available(&'static str),
    /// Link is known but the page is not published; show "coming soon"
    ComingSoon(&'static str),
}

pub fn docs_link_state(script: &RemediationScript) -> DocsLinkState {
    match script.docs_link {
        None => DocsLinkState::None,
        Some(link) if has_documentation(link) => DocsLinkState::Available(link),
        Some(link) => DocsLinkState::ComingSoon(link),
    }
}
