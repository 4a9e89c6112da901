//! Fedtester - Matrix connectivity tester core
//!
//! Probes a Matrix server name the way a browser-based tester would, and
//! turns every outcome into UI state: data, a classified failure per probe
//! step, and a remediation script for each failure.
//!
//! # Overview
//!
//! This library provides:
//! - A timed HTTP probe helper with transport failure classification
//! - Pure response validation (status, content type, JSON body, shape)
//! - A total (error kind × usage context) remediation table
//! - A single-flight fetch state store, one instance per UI session
//! - Client-server discovery, support info and federation-report probes
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between the probes and the server surface
//!   - Failure taxonomy, usage contexts, probe steps
//!   - Configuration
//!   - Error types
//!
//! - **`client`** - Probes, validation, remediation and the state store
//!
//! - **`backend`** - Axum JSON server (only compiled with `ssr` feature)
//!   - `/config.json` and per-session diagnostics endpoints
//!   - Session-scoped stores with idle cleanup
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server surface (enables the backend module and binary)
//!
//! # Usage
//!
//! ```rust,no_run
//! use fedtester::client::{ClientServerDiscovery, ProbeClient, ProbeConfig, ProbeStore};
//!
//! # async fn example() {
//! let config = ProbeConfig::default();
//! let client = ProbeClient::new(config.request_timeout());
//! let store = ProbeStore::new(ClientServerDiscovery::new(client, config));
//!
//! let state = store.request("matrix.org").await;
//! println!("{:?}", state.status());
//! # }
//! ```
//!
//! # Error Handling
//!
//! - Probe failures are data: `ProbeFailure` values stored per step
//! - Crate errors are `thiserror` enums in `shared::error`,
//!   `shared::config` and `backend::error`

/// Shared types and data structures
pub mod shared;

/// Probes and client-side state
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
