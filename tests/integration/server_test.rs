//! HTTP surface tests, driven through the router without a listener

use crate::common::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fedtester::backend::diagnostics::handlers::SESSION_HEADER;
use fedtester::backend::routes::create_router;
use fedtester::backend::server::{build_state, ServerConfig};
use fedtester::shared::AppConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{MockServer, ResponseTemplate};

fn app(api: Option<&MockServer>) -> Router {
    let mut builder = AppConfig::builder()
        .homeserver_url_template(TEST_HOMESERVER_TEMPLATE)
        .request_timeout(TEST_TIMEOUT);
    if let Some(api) = api {
        builder = builder.api_server_url(api.uri());
    }
    let config = ServerConfig {
        app: crate::assert_ok!(builder.build()),
        ..ServerConfig::default()
    };
    create_router(build_state(&config))
}

async fn get(app: &Router, uri: &str, session: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(session) = session {
        request = request.header(SESSION_HEADER, session);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let session = response
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, session, body)
}

#[tokio::test]
async fn test_config_json() {
    let api = MockServer::start().await;
    let (status, _, body) = get(&app(Some(&api)), "/config.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"api_server_url": api.uri(), "stats_opt_in": false}));
}

#[tokio::test]
async fn test_client_server_diagnostics() {
    let homeserver = start_healthy_homeserver().await;
    let app = app(None);
    let session = Uuid::new_v4().to_string();
    let uri = format!(
        "/api/diagnostics/client-server?server_name={}",
        server_name(&homeserver)
    );

    let (status, echoed, body) = get(&app, &uri, Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed.as_deref(), Some(session.as_str()));
    assert_eq!(body["status"], "success");
    assert_eq!(body["state"]["data"]["baseUrl"], homeserver.uri());
    assert_eq!(body["remediation"], json!({}));

    // Same session, same target: served from the session's cache
    let (_, _, again) = get(&app, &uri, Some(&session)).await;
    assert_eq!(again["state"]["fetchedAt"], body["state"]["fetchedAt"]);
}

#[tokio::test]
async fn test_session_generated_when_absent() {
    let homeserver = start_healthy_homeserver().await;
    let uri = format!(
        "/api/diagnostics/client-server?server_name={}",
        server_name(&homeserver)
    );

    let (status, echoed, _) = get(&app(None), &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(Uuid::parse_str(&echoed.unwrap()).is_ok());
}

#[tokio::test]
async fn test_failed_probe_is_ok_with_remediation() {
    let homeserver = MockServer::start().await;
    mount_get(&homeserver, WELL_KNOWN_CLIENT, ResponseTemplate::new(404), 1).await;
    let uri = format!(
        "/api/diagnostics/client-server?server_name={}",
        server_name(&homeserver)
    );

    let (status, _, body) = get(&app(None), &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["state"]["errors"]["well_known"]["kind"], "not_found");
    assert_eq!(body["remediation"]["well_known"]["id"], "not_found.wellknown");
}

#[tokio::test]
async fn test_support_warning_remediation() {
    let homeserver = MockServer::start().await;
    mount_get(
        &homeserver,
        WELL_KNOWN_SUPPORT,
        typed_response(200, r#"{"contacts": []}"#, "text/plain"),
        1,
    )
    .await;
    let uri = format!(
        "/api/diagnostics/support?server_name={}",
        server_name(&homeserver)
    );

    let (status, _, body) = get(&app(None), &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["data"]["contacts"], json!([]));
    assert_eq!(body["remediation"]["support"]["id"], "content_type_warning");
}

#[tokio::test]
async fn test_bad_requests() {
    let app = app(None);

    let (status, _, body) = get(&app, "/api/diagnostics/client-server", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _, _) = get(
        &app,
        "/api/diagnostics/client-server?server_name=matrix.org",
        Some("not-a-uuid"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(
        &app,
        "/api/diagnostics/support?server_name=bad%20name",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_federation_without_api() {
    let (status, _, body) = get(
        &app(None),
        "/api/diagnostics/federation?server_name=matrix.org",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
    assert_eq!(body["error"], "missing value: api_server_url");

    let (status, _, body) = get(&app(None), "/api/stats", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "missing value: api_server_url");
}

#[tokio::test]
async fn test_federation_diagnostics() {
    let api = MockServer::start().await;
    mount_get(
        &api,
        "/api/federation/report",
        json_response(json!({"FederationOK": true, "Version": {"name": "Synapse"}})),
        1,
    )
    .await;

    let (status, _, body) = get(
        &app(Some(&api)),
        "/api/diagnostics/federation?server_name=https://matrix.org/",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serverName"], "matrix.org");
    assert_eq!(body["state"]["data"]["federationOk"], true);
}

#[tokio::test]
async fn test_stats_upstream_failure() {
    let api = MockServer::start().await;
    mount_get(&api, "/metrics", ResponseTemplate::new(500), 1).await;

    let (status, _, body) = get(&app(Some(&api)), "/api/stats", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _, body) = get(&app(None), "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
