//! Diagnostics Module
//!
//! Server-side entry points to the probes: one store set per UI session,
//! and the HTTP handlers that drive them.
//!
//! # Module Structure
//!
//! ```text
//! diagnostics/
//! ├── mod.rs       - Module exports and documentation
//! ├── sessions.rs  - Session registry and store factory
//! └── handlers.rs  - /api/diagnostics/* handlers
//! ```

/// Session-scoped stores
pub mod sessions;

/// Diagnostics route handlers
pub mod handlers;

pub use handlers::{client_server_diagnostics, federation_diagnostics, support_diagnostics};
pub use sessions::{SessionRegistry, SessionStores, StoreFactory};
