/**
 * Site Handlers
 *
 * # Routes
 *
 * - `GET /config.json` - federation-report API base for the front end
 * - `GET /api/stats` - parsed metrics of the federation-report API
 */

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::client::stats::Metrics;
use crate::client::ProbeConfig;
use crate::shared::ConfigError;
use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

/// Body of `/config.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigResponse {
    pub api_server_url: Option<String>,
    pub stats_opt_in: bool,
}

/// Runtime configuration for the front end
pub async fn config_json(State(config): State<Arc<ProbeConfig>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        api_server_url: config.app().api_server_url.clone(),
        stats_opt_in: config.stats_opt_in(),
    })
}

/// Tester statistics
///
/// # Errors
///
/// * `503 Service Unavailable` - no federation-report API configured
/// * `502 Bad Gateway` - the metrics page could not be fetched
pub async fn stats(State(state): State<AppState>) -> Result<Json<Metrics>, BackendError> {
    let client = state
        .stats
        .as_ref()
        .ok_or(ConfigError::MissingValue("api_server_url"))?;
    let metrics = client.fetch().await.map_err(BackendError::Upstream)?;
    Ok(Json(metrics))
}
