//! Site Module
//!
//! Endpoints the front end needs besides the probes themselves: the
//! runtime configuration (`/config.json`) and the tester statistics page.

/// Config and stats handlers
pub mod handlers;

pub use handlers::{config_json, stats};
