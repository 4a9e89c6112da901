//! Mock server helpers for integration tests
//!
//! Wiremock stand-ins for a Matrix homeserver and for the
//! federation-report API.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WELL_KNOWN_CLIENT: &str = "/.well-known/matrix/client";
pub const WELL_KNOWN_SUPPORT: &str = "/.well-known/matrix/support";
pub const CLIENT_VERSIONS: &str = "/_matrix/client/versions";

/// JSON response with `application/json`
pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Response with an explicit content type
pub fn typed_response(status: u16, body: &str, content_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), content_type)
}

/// Well-known body delegating to `base_url`
pub fn well_known_body(base_url: &str) -> Value {
    json!({ "m.homeserver": { "base_url": base_url } })
}

pub fn versions_body() -> Value {
    json!({ "versions": ["r0.6.1", "v1.1", "v1.11"], "unstable_features": {} })
}

/// Mount a GET `route` answering with `response`, expected `times` times
pub async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// A homeserver whose well-known points back at itself (with a trailing
/// slash) and whose versions endpoint answers
pub async fn start_healthy_homeserver() -> MockServer {
    let server = MockServer::start().await;
    let base_url = format!("{}/", server.uri());
    mount_get(&server, WELL_KNOWN_CLIENT, json_response(well_known_body(&base_url)), 1).await;
    mount_get(&server, CLIENT_VERSIONS, json_response(versions_body()), 1).await;
    server
}

/// Same as [`start_healthy_homeserver`] but the well-known answer is delayed
pub async fn start_slow_homeserver(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_get(
        &server,
        WELL_KNOWN_CLIENT,
        json_response(well_known_body(&base_url)).set_delay(delay),
        1,
    )
    .await;
    mount_get(&server, CLIENT_VERSIONS, json_response(versions_body()), 1).await;
    server
}

/// Paths requested from `server`, in order
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}
