/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Site
 * - `GET /config.json` - front-end runtime configuration
 * - `GET /api/stats` - tester statistics
 *
 * ## Diagnostics
 * - `GET /api/diagnostics/client-server` - well-known + versions probe
 * - `GET /api/diagnostics/support` - support info probe
 * - `GET /api/diagnostics/federation` - federation report
 */

use crate::backend::diagnostics::{
    client_server_diagnostics, federation_diagnostics, support_diagnostics,
};
use crate::backend::server::state::AppState;
use crate::backend::site::{config_json, stats};
use axum::{routing::get, Router};

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/config.json", get(config_json))
        .route("/api/stats", get(stats))
        .route("/api/diagnostics/client-server", get(client_server_diagnostics))
        .route("/api/diagnostics/support", get(support_diagnostics))
        .route("/api/diagnostics/federation", get(federation_diagnostics))
}
