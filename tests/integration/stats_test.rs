//! Stats page fetch tests

use crate::common::*;
use fedtester::client::stats::{MetricType, StatsClient};
use fedtester::shared::ErrorKind;
use pretty_assertions::assert_eq;
use wiremock::{MockServer, ResponseTemplate};

const METRICS: &str = "# HELP federationtester_federation_ok_total Reports by verdict.
# TYPE federationtester_federation_ok_total counter
federationtester_federation_ok_total{ok=\"true\"} 812
federationtester_federation_ok_total{ok=\"false\"} 97
";

#[tokio::test]
async fn test_fetch_metrics() {
    let api = MockServer::start().await;
    mount_get(
        &api,
        "/metrics",
        typed_response(200, METRICS, "text/plain; version=0.0.4; charset=utf-8"),
        1,
    )
    .await;

    let client = crate::assert_ok!(StatsClient::new(probe_client(), &api_probe_config(&api)));
    let metrics = crate::assert_ok!(client.fetch().await);

    let family = metrics.family("federationtester_federation_ok_total").unwrap();
    assert_eq!(family.metric_type, MetricType::Counter);
    assert_eq!(family.total(), 909.0);
}

#[tokio::test]
async fn test_missing_metrics_page() {
    let api = MockServer::start().await;
    mount_get(&api, "/metrics", ResponseTemplate::new(404), 1).await;

    let client = crate::assert_ok!(StatsClient::new(probe_client(), &api_probe_config(&api)));
    let failure = client.fetch().await.unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::NotFound);
}

#[test]
fn test_stats_need_api() {
    assert!(StatsClient::new(probe_client(), &probe_config()).is_err());
}
