//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading (app config, port, sessions)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: defaults, config file, environment
//! 2. **State Creation**: probe client, session registry, stats client
//! 3. **Background Tasks**: idle session cleanup
//! 4. **Router Creation**: routes plus the panic boundary

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{load_server_config, ServerConfig};
pub use init::{build_state, create_app};
pub use state::AppState;
