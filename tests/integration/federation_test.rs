//! Federation-report API client tests

use crate::common::*;
use fedtester::client::remediation::resolve;
use fedtester::client::{FederationClient, FederationReportSequence, FetchStatus, ProbeStore};
use fedtester::shared::{ErrorKind, ProbeStep};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT_PATH: &str = "/api/federation/report";

fn report_body(ok: bool) -> serde_json::Value {
    json!({
        "WellKnownResult": { "m.server": "matrix-federation.matrix.org:443" },
        "DNSResult": { "SRVSkipped": true },
        "ConnectionReports": {},
        "ConnectionErrors": {},
        "Version": { "name": "Synapse", "version": "1.98.0" },
        "FederationOK": ok
    })
}

fn client(api: &MockServer) -> FederationClient {
    crate::assert_ok!(FederationClient::new(probe_client(), &api_probe_config(api)))
}

#[tokio::test]
async fn test_fetch_report_sends_query() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("server_name", "matrix.org"))
        .and(query_param("stats_opt_in", "true"))
        .and(query_param("no_cache", "true"))
        .respond_with(json_response(report_body(true)))
        .expect(1)
        .mount(&api)
        .await;

    let report = crate::assert_ok!(client(&api).fetch_report("matrix.org", true).await);
    assert!(report.federation_ok);
    assert_eq!(report.report["Version"]["name"], "Synapse");
}

#[tokio::test]
async fn test_failed_federation_is_still_a_report() {
    let api = MockServer::start().await;
    mount_get(&api, REPORT_PATH, json_response(report_body(false)), 1).await;

    let report = crate::assert_ok!(client(&api).fetch_report("example.org", false).await);
    assert!(!report.federation_ok);
}

#[tokio::test]
async fn test_api_error_uses_federation_context() {
    let api = MockServer::start().await;
    mount_get(&api, REPORT_PATH, ResponseTemplate::new(500), 1).await;

    let failure = client(&api).fetch_report("example.org", false).await.unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::ServerError);
    crate::assert_contains!(failure.technical_details().unwrap(), "500");
    assert_eq!(
        resolve(failure.kind(), ProbeStep::FederationReport.usage_context()).id,
        "server_error"
    );
}

#[tokio::test]
async fn test_sequence_records_failure_in_report_slot() {
    let api = MockServer::start().await;
    mount_get(&api, REPORT_PATH, ResponseTemplate::new(404), 1).await;

    let store = ProbeStore::new(FederationReportSequence::new(client(&api), false));
    let state = store.request("example.org").await;

    assert_eq!(state.status(), FetchStatus::Failed);
    let failure = crate::assert_step_failed!(state, ProbeStep::FederationReport, ErrorKind::NotFound);
    assert_eq!(
        resolve(failure.kind(), ProbeStep::FederationReport.usage_context()).id,
        "not_found.federation"
    );
}

#[tokio::test]
async fn test_sequence_caches_report() {
    let api = MockServer::start().await;
    mount_get(&api, REPORT_PATH, json_response(report_body(true)), 1).await;

    let store = ProbeStore::new(FederationReportSequence::new(client(&api), false));
    let first = store.request("matrix.org").await;
    let second = store.request("matrix.org").await;

    assert_eq!(first, second);
    assert!(second.data.unwrap().federation_ok);
}
