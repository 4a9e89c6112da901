//! Integration tests
//!
//! Probes run against wiremock servers standing in for homeservers and for
//! the federation-report API.

mod federation_test;
mod probe_test;
#[cfg(feature = "ssr")]
mod server_test;
mod stats_test;
mod store_test;
