//! Application configuration module
//!
//! Provides configuration types for the application.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`FEDTESTER_CONFIG`, or
//!    `<config dir>/fedtester/config.toml`)
//! 3. environment variables (`FEDTESTER_*`)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default template used to reach a homeserver's public endpoints
pub const DEFAULT_HOMESERVER_URL_TEMPLATE: &str = "https://{server}";

/// Per-request timeout applied to every probe
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Placeholder replaced by the server name in the homeserver URL template
pub const SERVER_PLACEHOLDER: &str = "{server}";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the federation-report API
    pub api_server_url: Option<String>,
    /// How to reach a homeserver; `{server}` is replaced by the server name
    pub homeserver_url_template: String,
    /// Abort each HTTP call after this long
    pub request_timeout: Duration,
    /// Forwarded to the federation-report API as `stats_opt_in`
    pub stats_opt_in: bool,
    /// Emulate browser CORS enforcement on client-side probes
    pub check_cors: bool,
    /// Cached probe results older than this are refetched (`None` = never)
    pub cache_max_age: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_server_url: None,
            homeserver_url_template: DEFAULT_HOMESERVER_URL_TEMPLATE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stats_opt_in: false,
            check_cors: false,
            cache_max_age: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the default file location and the process
    /// environment
    pub fn load() -> Result<AppConfig, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let path = lookup("FEDTESTER_CONFIG")
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut builder = AppConfig::builder();
        if let Some(path) = path.filter(|p| p.exists()) {
            tracing::info!("Loading configuration from {}", path.display());
            builder = builder.file(&path)?;
        }
        builder.env(lookup)?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_server_url {
            validate_http_url(url)?;
        }
        if !self.homeserver_url_template.contains(SERVER_PLACEHOLDER) {
            return Err(ConfigError::InvalidValue {
                key: "homeserver_url_template",
                message: format!("must contain {}", SERVER_PLACEHOLDER),
            });
        }
        validate_http_url(
            &self
                .homeserver_url_template
                .replace(SERVER_PLACEHOLDER, "example.org"),
        )?;
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_server_url: Option<String>,
    homeserver_url_template: Option<String>,
    request_timeout: Option<Duration>,
    stats_opt_in: Option<bool>,
    check_cors: Option<bool>,
    cache_max_age: Option<Duration>,
}

/// On-disk shape of the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_server_url: Option<String>,
    homeserver_url_template: Option<String>,
    request_timeout_secs: Option<u64>,
    stats_opt_in: Option<bool>,
    check_cors: Option<bool>,
    cache_max_age_secs: Option<u64>,
}

impl AppConfigBuilder {
    /// Set the federation-report API base URL
    pub fn api_server_url(mut self, url: impl Into<String>) -> Self {
        self.api_server_url = Some(url.into());
        self
    }

    pub fn homeserver_url_template(mut self, template: impl Into<String>) -> Self {
        self.homeserver_url_template = Some(template.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn stats_opt_in(mut self, opt_in: bool) -> Self {
        self.stats_opt_in = Some(opt_in);
        self
    }

    pub fn check_cors(mut self, enabled: bool) -> Self {
        self.check_cors = Some(enabled);
        self
    }

    pub fn cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = Some(max_age);
        self
    }

    /// Overlay values from a TOML file
    pub fn file(self, path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.toml_str(&contents).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    /// Overlay values from TOML text
    pub fn toml_str(mut self, contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;

        if let Some(url) = file.api_server_url {
            self.api_server_url = Some(url);
        }
        if let Some(template) = file.homeserver_url_template {
            self.homeserver_url_template = Some(template);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(opt_in) = file.stats_opt_in {
            self.stats_opt_in = Some(opt_in);
        }
        if let Some(enabled) = file.check_cors {
            self.check_cors = Some(enabled);
        }
        if let Some(secs) = file.cache_max_age_secs {
            self.cache_max_age = Some(Duration::from_secs(secs));
        }
        Ok(self)
    }

    /// Overlay values from environment variables, read through `lookup`
    pub fn env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FEDTESTER_API_SERVER_URL") {
            self.api_server_url = Some(url);
        }
        if let Some(template) = lookup("FEDTESTER_HOMESERVER_URL_TEMPLATE") {
            self.homeserver_url_template = Some(template);
        }
        if let Some(raw) = lookup("FEDTESTER_REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "FEDTESTER_REQUEST_TIMEOUT_SECS",
                message: format!("'{}' is not a number of seconds", raw),
            })?;
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("FEDTESTER_STATS_OPT_IN") {
            self.stats_opt_in = Some(parse_flag("FEDTESTER_STATS_OPT_IN", &raw)?);
        }
        if let Some(raw) = lookup("FEDTESTER_CHECK_CORS") {
            self.check_cors = Some(parse_flag("FEDTESTER_CHECK_CORS", &raw)?);
        }
        if let Some(raw) = lookup("FEDTESTER_CACHE_MAX_AGE_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "FEDTESTER_CACHE_MAX_AGE_SECS",
                message: format!("'{}' is not a number of seconds", raw),
            })?;
            self.cache_max_age = Some(Duration::from_secs(secs));
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_server_url: self
                .api_server_url
                .map(|url| url.trim_end_matches('/').to_string()),
            homeserver_url_template: self
                .homeserver_url_template
                .unwrap_or(defaults.homeserver_url_template),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            stats_opt_in: self.stats_opt_in.unwrap_or(defaults.stats_opt_in),
            check_cors: self.check_cors.unwrap_or(defaults.check_cors),
            cache_max_age: self.cache_max_age.or(defaults.cache_max_age),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration{}: {message}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fedtester").join("config.toml"))
}

fn validate_http_url(raw: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            message: format!("'{}' is not a boolean", other),
        }),
    }
}
