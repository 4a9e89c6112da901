/**
 * Router Configuration
 *
 * # Route Order
 *
 * 1. API routes
 * 2. Fallback handler (JSON 404)
 * 3. Error boundary around everything
 */

use crate::backend::error::{handle_panic, BackendError};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use axum::{http::StatusCode, Router};
use tower_http::catch_panic::CatchPanicLayer;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new());

    // Fallback handler for 404
    let router = router.fallback(|| async {
        BackendError::handler(StatusCode::NOT_FOUND, "Not Found")
    });

    with_error_boundary(router).with_state(app_state)
}

/// Wrap a router so that a panicking handler answers with the generic
/// error page instead of dropping the connection
pub fn with_error_boundary<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(CatchPanicLayer::custom(handle_panic))
}
