/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Create the shared probe client and configuration
 * 2. Create the session registry (stores are built lazily per session)
 * 3. Create the stats client if a federation-report API is configured
 * 4. Create and configure the router
 * 5. Start the idle session cleanup task
 */

use crate::backend::diagnostics::{SessionRegistry, StoreFactory};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{ServerConfig, SESSION_CLEANUP_INTERVAL};
use crate::backend::server::state::AppState;
use crate::client::stats::StatsClient;
use crate::client::{ProbeClient, ProbeConfig};
use axum::Router;
use std::sync::Arc;

/// Build the application state without starting any background task
pub fn build_state(config: &ServerConfig) -> AppState {
    let probe_config = ProbeConfig::new(config.app.clone());
    let client = ProbeClient::new(probe_config.request_timeout());

    let sessions = SessionRegistry::new(StoreFactory::new(client.clone(), probe_config.clone()));
    let stats = StatsClient::new(client, &probe_config).ok();

    AppState {
        config: Arc::new(probe_config),
        sessions,
        stats,
    }
}

/// Create and configure the Axum application
///
/// Must be called inside a tokio runtime: the idle session cleanup task is
/// spawned here.
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing fedtester backend server");

    let app_state = build_state(config);
    let app = create_router(app_state.clone());

    let sessions = app_state.sessions.clone();
    let max_idle = config.session_idle_timeout;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_idle_sessions(max_idle);
            tracing::debug!(
                "Cleaned up {} idle sessions, {} remaining",
                removed,
                sessions.session_count()
            );
        }
    });

    tracing::info!("Router configured with periodic session cleanup task");

    app
}
