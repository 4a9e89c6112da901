//! Backend Module
//!
//! Server-side code: a small Axum JSON server that hosts the probes for a
//! browser front end.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`diagnostics`** - Session-scoped probe stores and their handlers
//! - **`site`** - `/config.json` and the stats page
//! - **`error`** - Backend-specific error types and the panic page
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── diagnostics/    - Probe sessions and handlers
//! ├── site/           - Config and stats handlers
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the probe configuration, the session registry and the
//! optional stats client. Each UI session (identified by `X-Session-Id`) owns
//! its own stores, so single-flight de-duplication and target supersession
//! never leak between users.
//!
//! # Error Handling
//!
//! - Probe failures are part of a 200 response body, never an HTTP error
//! - `BackendError` for requests the server cannot serve
//! - A panicking handler is caught by `CatchPanicLayer` and answered with a
//!   generic error page
//!
//! # Example
//!
//! ```rust,no_run
//! use fedtester::backend::server::{create_app, load_server_config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_server_config()?;
//! let app = create_app(&config).await;
//! // Use app with axum::serve
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Probe sessions and diagnostics handlers
pub mod diagnostics;

/// Config and stats handlers
pub mod site;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, AppState};
