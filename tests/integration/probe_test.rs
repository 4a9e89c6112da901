//! HTTP probe helper tests
//!
//! Completed exchanges are never failures at this layer; only exchanges
//! that produced no response are classified.

use crate::common::*;
use fedtester::client::ProbeClient;
use fedtester::shared::ErrorKind;
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_non_success_status_is_a_response() {
    let server = MockServer::start().await;
    mount_get(&server, WELL_KNOWN_CLIENT, ResponseTemplate::new(404), 1).await;

    let url = format!("{}{}", server.uri(), WELL_KNOWN_CLIENT);
    let response = crate::assert_ok!(probe_client().get(&url).await);
    assert_eq!(response.status, 404);
    assert_eq!(response.url, url);
}

#[tokio::test]
async fn test_response_headers_and_body_captured() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        CLIENT_VERSIONS,
        json_response(versions_body()).insert_header("Access-Control-Allow-Origin", "*"),
        1,
    )
    .await;

    let response = crate::assert_ok!(
        probe_client()
            .get(&format!("{}{}", server.uri(), CLIENT_VERSIONS))
            .await
    );
    assert!(response.is_success());
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    crate::assert_contains!(response.body, "v1.11");
}

#[tokio::test]
async fn test_requests_ask_for_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_CLIENT))
        .and(header("accept", "application/json"))
        .respond_with(json_response(well_known_body("https://example.org")))
        .expect(1)
        .mount(&server)
        .await;

    let response = probe_client()
        .get(&format!("{}{}", server.uri(), WELL_KNOWN_CLIENT))
        .await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_timeout_is_classified() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        WELL_KNOWN_CLIENT,
        json_response(well_known_body("https://example.org")).set_delay(Duration::from_secs(2)),
        2,
    )
    .await;

    let url = format!("{}{}", server.uri(), WELL_KNOWN_CLIENT);
    let failure = ProbeClient::new(Duration::from_millis(100))
        .get(&url)
        .await
        .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Timeout);
    assert_eq!(failure.message(), "errors.timeout");
    assert_eq!(failure.endpoint(), Some(url.as_str()));

    // A per-call timeout overrides the client default
    let failure = probe_client()
        .get_with_timeout(&url, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_refused_connection_is_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let failure = probe_client()
        .get(&format!("http://{}{}", address, WELL_KNOWN_CLIENT))
        .await
        .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::Network);
    assert!(failure.technical_details().is_some());
    assert!(failure.http_status().is_none());
}

#[tokio::test]
async fn test_preflight_sends_cors_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .and(path(CLIENT_VERSIONS))
        .and(header("origin", "https://tester.example"))
        .and(header("access-control-request-method", "GET"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("Access-Control-Allow-Origin", "*")
                .insert_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = crate::assert_ok!(
        probe_client()
            .preflight(
                &format!("{}{}", server.uri(), CLIENT_VERSIONS),
                "https://tester.example"
            )
            .await
    );
    assert_eq!(response.status, 204);
    assert_eq!(
        response.header("access-control-allow-methods"),
        Some("GET, POST, OPTIONS")
    );
}
