/**
 * Application State Management
 *
 * The `AppState` struct is the central state container, holding:
 * - The probe configuration (endpoint layout, timeouts)
 * - The session registry (one store set per UI session)
 * - The stats client, when a federation-report API is configured
 *
 * # Thread Safety
 *
 * - `Arc<ProbeConfig>` is read-only after startup
 * - `SessionRegistry` guards its map with a mutex; each store guards its own
 *   state
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part of the
 * state they need.
 */

use crate::backend::diagnostics::SessionRegistry;
use crate::client::stats::StatsClient;
use crate::client::ProbeConfig;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Probe configuration shared by every session
    pub config: Arc<ProbeConfig>,

    /// Per-session probe stores
    pub sessions: SessionRegistry,

    /// `None` if no federation-report API is configured
    pub stats: Option<StatsClient>,
}

impl FromRef<AppState> for Arc<ProbeConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
