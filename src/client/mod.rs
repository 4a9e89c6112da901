//! Client Module
//!
//! Everything that talks to a Matrix server or to the federation-report API
//! and turns what comes back into UI state.
//!
//! # Layers
//!
//! - **`http`** - timed GET / preflight, transport failures classified
//! - **`classifier`** - ordered rule table mapping transport failures to kinds
//! - **`validator`** - pure status / content-type / body / shape checks
//! - **`remediation`** - static (kind × context) table of remediation scripts
//! - **`store`** - single-flight, single-target state store
//! - **`discovery`**, **`federation`**, **`stats`** - the concrete probes

/// HTTP probe helper
pub mod http;

/// Transport failure classifier
pub mod classifier;

/// Response validator
pub mod validator;

/// Solution resolver
pub mod remediation;

/// Shared fetch state store
pub mod store;

/// Probe configuration and endpoint URLs
pub mod config;

/// Client-server and support discovery sequences
pub mod discovery;

/// Federation-report API client
pub mod federation;

/// Tester statistics
pub mod stats;

pub use classifier::{classify, TransportFailure};
pub use config::ProbeConfig;
pub use discovery::{ClientServerDiscovery, ClientServerInfo, SupportInfo, SupportInfoDiscovery};
pub use federation::{FederationClient, FederationReport, FederationReportSequence};
pub use http::{ProbeClient, ProbeResponse, ProbeResult};
pub use remediation::{resolve, RemediationScript};
pub use store::{FetchStatus, ProbeSequence, ProbeState, ProbeStore, StoreOptions};
