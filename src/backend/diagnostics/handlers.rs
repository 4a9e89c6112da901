/**
 * Diagnostics Handlers
 *
 * # Routes
 *
 * - `GET /api/diagnostics/client-server?server_name=...` - well-known + versions
 * - `GET /api/diagnostics/support?server_name=...` - support info
 * - `GET /api/diagnostics/federation?server_name=...` - federation report
 *
 * Each accepts `refresh=true` to bypass a cached result. The store state
 * is returned as-is together with the remediation script for every
 * recorded failure, resolved in the usage context of the step that failed.
 *
 * # Sessions
 *
 * The `X-Session-Id` header selects the session's stores. When absent a new
 * id is generated; the id in use is always echoed back in the response.
 */

use crate::backend::diagnostics::sessions::SessionRegistry;
use crate::backend::error::BackendError;
use crate::client::remediation::{
    docs_link_state, resolve_failure, DocsLinkState, RemediationScript,
};
use crate::client::{FetchStatus, ProbeSequence, ProbeState, ProbeStore};
use crate::shared::{normalize_server_name, ConfigError, ProbeFailure, ProbeStep};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Session header name
pub const SESSION_HEADER: &str = "x-session-id";

/// Query parameters shared by every diagnostics route
#[derive(Debug, Default, Deserialize)]
pub struct DiagnosticsQuery {
    pub server_name: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

/// Remediation attached to one failed step
#[derive(Debug, Serialize)]
pub struct RemediationView {
    #[serde(flatten)]
    pub script: &'static RemediationScript,
    pub docs: DocsLinkState,
}

impl RemediationView {
    fn for_step(step: ProbeStep, failure: &ProbeFailure) -> Self {
        let script = resolve_failure(failure, step.usage_context());
        Self {
            script,
            docs: docs_link_state(script),
        }
    }
}

/// Diagnostics response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse<D> {
    pub server_name: String,
    pub status: FetchStatus,
    pub state: ProbeState<D>,
    pub remediation: BTreeMap<ProbeStep, RemediationView>,
}

impl<D> DiagnosticsResponse<D> {
    pub fn new(server_name: String, state: ProbeState<D>) -> Self {
        let remediation = state
            .errors
            .iter()
            .map(|(step, failure)| (*step, RemediationView::for_step(*step, failure)))
            .collect();
        Self {
            server_name,
            status: state.status(),
            state,
            remediation,
        }
    }
}

/// Session id from the request headers, or a new one
pub fn session_id(headers: &HeaderMap) -> Result<Uuid, BackendError> {
    match headers.get(SESSION_HEADER) {
        None => Ok(Uuid::new_v4()),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or_else(|| {
                BackendError::handler(StatusCode::BAD_REQUEST, "X-Session-Id must be a UUID")
            }),
    }
}

fn server_name(query: &DiagnosticsQuery) -> Result<String, BackendError> {
    let raw = query.server_name.as_deref().ok_or_else(|| {
        BackendError::handler(StatusCode::BAD_REQUEST, "server_name is required")
    })?;
    Ok(normalize_server_name(raw)?)
}

async fn run<S: ProbeSequence>(
    store: &ProbeStore<S>,
    server_name: &str,
    refresh: bool,
) -> ProbeState<S::Data> {
    if refresh {
        store.refresh(server_name).await
    } else {
        store.request(server_name).await
    }
}

fn respond<D: Serialize>(session: Uuid, server_name: String, state: ProbeState<D>) -> Response {
    let mut response = Json(DiagnosticsResponse::new(server_name, state)).into_response();
    if let Ok(value) = HeaderValue::from_str(&session.to_string()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

/// Client-server discovery for a server name
pub async fn client_server_diagnostics(
    State(sessions): State<SessionRegistry>,
    headers: HeaderMap,
    Query(query): Query<DiagnosticsQuery>,
) -> Result<Response, BackendError> {
    let session = session_id(&headers)?;
    let server_name = server_name(&query)?;
    tracing::info!(%session, server_name = %server_name, "Client-server diagnostics requested");

    let stores = sessions.session(session);
    let state = run(&stores.client_server, &server_name, query.refresh).await;
    Ok(respond(session, server_name, state))
}

/// Support info for a server name
pub async fn support_diagnostics(
    State(sessions): State<SessionRegistry>,
    headers: HeaderMap,
    Query(query): Query<DiagnosticsQuery>,
) -> Result<Response, BackendError> {
    let session = session_id(&headers)?;
    let server_name = server_name(&query)?;
    tracing::info!(%session, server_name = %server_name, "Support diagnostics requested");

    let stores = sessions.session(session);
    let state = run(&stores.support, &server_name, query.refresh).await;
    Ok(respond(session, server_name, state))
}

/// Federation report for a server name
pub async fn federation_diagnostics(
    State(sessions): State<SessionRegistry>,
    headers: HeaderMap,
    Query(query): Query<DiagnosticsQuery>,
) -> Result<Response, BackendError> {
    let session = session_id(&headers)?;
    let server_name = server_name(&query)?;
    tracing::info!(%session, server_name = %server_name, "Federation diagnostics requested");

    let stores = sessions.session(session);
    let store = stores
        .federation
        .as_ref()
        .ok_or(ConfigError::MissingValue("api_server_url"))?;
    let state = run(store, &server_name, query.refresh).await;
    Ok(respond(session, server_name, state))
}
