use crate::client::http::DEFAULT_PREFLIGHT_ORIGIN;
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, SERVER_PLACEHOLDER};
use std::time::Duration;

const WELL_KNOWN_CLIENT_PATH: &str = "/.well-known/matrix/client";
const WELL_KNOWN_SUPPORT_PATH: &str = "/.well-known/matrix/support";
const CLIENT_VERSIONS_PATH: &str = "/_matrix/client/versions";
const FEDERATION_REPORT_PATH: &str = "/api/federation/report";
const METRICS_PATH: &str = "/metrics";

/// Probe configuration: the application config plus the URL layout of every
/// endpoint the probes talk to.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    app: AppConfig,
    preflight_origin: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl ProbeConfig {
    pub fn new(app: AppConfig) -> Self {
        Self {
            app,
            preflight_origin: DEFAULT_PREFLIGHT_ORIGIN.to_string(),
        }
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(builder.build()?))
    }

    /// Origin sent with emulated preflights
    pub fn with_preflight_origin(mut self, origin: impl Into<String>) -> Self {
        self.preflight_origin = origin.into();
        self
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout
    }

    pub fn check_cors(&self) -> bool {
        self.app.check_cors
    }

    pub fn stats_opt_in(&self) -> bool {
        self.app.stats_opt_in
    }

    pub fn preflight_origin(&self) -> &str {
        &self.preflight_origin
    }

    /// Homeserver origin for `server`, without trailing slash
    pub fn homeserver_url(&self, server: &str) -> String {
        self.app
            .homeserver_url_template
            .replace(SERVER_PLACEHOLDER, server)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn well_known_client_url(&self, server: &str) -> String {
        format!("{}{}", self.homeserver_url(server), WELL_KNOWN_CLIENT_PATH)
    }

    pub fn well_known_support_url(&self, server: &str) -> String {
        format!("{}{}", self.homeserver_url(server), WELL_KNOWN_SUPPORT_PATH)
    }

    /// Federation-report API base URL
    pub fn api_base(&self) -> Result<&str, ConfigError> {
        self.app
            .api_server_url
            .as_deref()
            .ok_or(ConfigError::MissingValue("api_server_url"))
    }

    /// Full URL for an API path
    pub fn api_url(&self, path: &str) -> Result<String, ConfigError> {
        Ok(format!("{}{}", self.api_base()?, path))
    }

    pub fn federation_report_url(&self) -> Result<String, ConfigError> {
        self.api_url(FEDERATION_REPORT_PATH)
    }

    pub fn metrics_url(&self) -> Result<String, ConfigError> {
        self.api_url(METRICS_PATH)
    }
}

/// Client-server versions URL for a discovered base URL.
///
/// Trailing slashes on the base are stripped so the result never contains a
/// double slash.
pub fn versions_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), CLIENT_VERSIONS_PATH)
}
