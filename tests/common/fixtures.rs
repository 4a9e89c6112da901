//! Probe configuration fixtures
//!
//! Mock servers listen on `127.0.0.1:<port>`, so tests use that address as
//! the Matrix server name and reach it over plain HTTP.

use fedtester::client::{ProbeClient, ProbeConfig};
use fedtester::shared::AppConfig;
use std::time::Duration;
use wiremock::MockServer;

/// Homeserver template pointing at plain-HTTP mock servers
pub const TEST_HOMESERVER_TEMPLATE: &str = "http://{server}";

/// Request timeout used by most tests
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Server name under which `server` is reachable
pub fn server_name(server: &MockServer) -> String {
    server.address().to_string()
}

/// Probe configuration for mock homeservers
pub fn probe_config() -> ProbeConfig {
    probe_config_with(AppConfig::builder())
}

/// Probe configuration with CORS emulation enabled
pub fn cors_probe_config() -> ProbeConfig {
    probe_config_with(AppConfig::builder().check_cors(true))
}

/// Probe configuration whose federation-report API is `api`
pub fn api_probe_config(api: &MockServer) -> ProbeConfig {
    probe_config_with(AppConfig::builder().api_server_url(api.uri()))
}

fn probe_config_with(builder: fedtester::shared::AppConfigBuilder) -> ProbeConfig {
    let builder = builder
        .homeserver_url_template(TEST_HOMESERVER_TEMPLATE)
        .request_timeout(TEST_TIMEOUT);
    crate::assert_ok!(ProbeConfig::with_builder(builder), "test config must be valid")
}

/// Probe client with the test timeout
pub fn probe_client() -> ProbeClient {
    ProbeClient::new(TEST_TIMEOUT)
}
