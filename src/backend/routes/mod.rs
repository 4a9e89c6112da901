//! Route Configuration Module
//!
//! # Architecture
//!
//! - **`router`** - Main router creation, fallback and panic boundary
//! - **`api_routes`** - `/config.json` and `/api/*` endpoints
//!
//! # Route Organization
//!
//! 1. **API Routes** - config, diagnostics, stats
//! 2. **Fallback Handler** - JSON 404
//! 3. **Error Boundary** - a panicking handler becomes a generic 500 page

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::{create_router, with_error_boundary};
