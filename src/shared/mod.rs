//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the probing client and the server surface. These types are used for
//! serialization and communication with the UI over JSON.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types with no I/O of their
//! own. Everything here can be constructed in tests without a runtime.

/// Probe failure taxonomy and records
pub mod probe;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Server name normalization
pub mod server_name;

/// Re-export commonly used types for convenience
pub use probe::{ErrorKind, ProbeFailure, ProbeStep, UsageContext};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use server_name::normalize_server_name;
