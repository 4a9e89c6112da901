//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in HTTP handlers and can be converted to HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - Error type definitions and constructors
//! - **`conversion`** - `IntoResponse` and the panic page
//!
//! # HTTP Response Conversion
//!
//! All backend errors implement `IntoResponse` from Axum, allowing them to be
//! returned directly from handlers as a JSON body with the status code.
//!
//! Probe failures are not backend errors: a diagnostics request whose probe
//! failed still answers 200 with the failure in its state. Only requests the
//! server cannot serve at all end up here.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use conversion::handle_panic;
pub use types::BackendError;
