/**
 * Server Configuration
 *
 * Loads the application configuration (see `shared::config`) plus the
 * server-only settings read from the environment.
 *
 * # Environment
 *
 * - `SERVER_PORT` - listen port (default 3000)
 * - `FEDTESTER_SESSION_IDLE_SECS` - drop sessions idle this long (default 1800)
 */

use crate::shared::{AppConfig, ConfigError};
use std::time::Duration;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default session idle timeout
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// How often idle sessions are swept
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app: AppConfig,
    pub port: u16,
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            port: DEFAULT_PORT,
            session_idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }
}

impl ServerConfig {
    /// Apply server-only settings from an environment lookup
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SERVER_PORT") {
            self.port = raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "SERVER_PORT",
                    message: format!("'{}' is not a valid port", raw),
                })?;
        }
        if let Some(raw) = lookup("FEDTESTER_SESSION_IDLE_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "FEDTESTER_SESSION_IDLE_SECS",
                    message: e.to_string(),
                })?;
            self.session_idle_timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }
}

/// Load the complete server configuration from file and environment
pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
    let app = AppConfig::load()?;
    let config = ServerConfig {
        app,
        ..ServerConfig::default()
    }
    .with_env(|key| std::env::var(key).ok())?;

    match &config.app.api_server_url {
        Some(url) => tracing::info!("Federation-report API at {}", url),
        None => tracing::warn!("FEDTESTER_API_SERVER_URL not set. Federation reports and stats will be disabled."),
    }
    Ok(config)
}
