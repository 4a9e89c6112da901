//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Mock homeserver and tester API helpers (wiremock)
//! - Probe configuration fixtures
//! - Custom assertion macros

pub mod assertions;
pub mod fixtures;
pub mod mock_server;

// Re-export commonly used utilities
pub use fixtures::*;
pub use mock_server::*;
