//! # Client-side probe sequences
//!
//! The multi-step probes a [`ProbeStore`](crate::client::store::ProbeStore)
//! runs against a Matrix server name:
//!
//! - [`ClientServerDiscovery`]: `/.well-known/matrix/client`, then the
//!   discovered `{base_url}/_matrix/client/versions`
//! - [`SupportInfoDiscovery`]: `/.well-known/matrix/support`
//!
//! Every step goes through the probe helper and the response validator. A
//! failing step records its failure under its own [`ProbeStep`] slot and
//! stops the sequence; data gathered by earlier steps stays in the outcome.

use crate::client::config::{versions_url, ProbeConfig};
use crate::client::http::{ProbeClient, ProbeResponse};
use crate::client::store::{ProbeSequence, SequenceOutcome, StepReporter};
use crate::client::validator::{
    check_cors, check_preflight, check_shape, parse_json_body, validate_response,
    ValidationOptions,
};
use crate::shared::{ErrorKind, ProbeFailure, ProbeStep};
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const BASE_URL_PATH: &[&str] = &["m.homeserver", "base_url"];
const VERSIONS_PATH: &[&str] = &["versions"];

/// A validated JSON body plus any non-fatal warning raised on the way
#[derive(Debug)]
struct FetchedJson {
    response: ProbeResponse,
    body: Value,
    warning: Option<ProbeFailure>,
}

/// Fetch `url` for `step`, emulate CORS if configured, validate status and
/// content type, then parse the body.
async fn fetch_json(
    client: &ProbeClient,
    config: &ProbeConfig,
    step: ProbeStep,
    url: &str,
) -> Result<FetchedJson, ProbeFailure> {
    let response = client.get(url).await?;

    if config.check_cors() {
        if let Some(failure) = check_cors(&response) {
            return Err(failure);
        }
    }

    let options = ValidationOptions::new(step.usage_context());
    let warning = match validate_response(&response, &options) {
        Some(failure) if failure.is_warning() => Some(failure),
        Some(failure) => return Err(failure),
        None => None,
    };

    let body = parse_json_body(&response).map_err(|failure| note_warning(failure, warning.as_ref()))?;
    Ok(FetchedJson {
        response,
        body,
        warning,
    })
}

/// Carry a tolerated content-type mismatch into the fatal failure that
/// replaces it in the step's slot
fn note_warning(failure: ProbeFailure, warning: Option<&ProbeFailure>) -> ProbeFailure {
    let Some(mismatch) = warning.and_then(ProbeFailure::technical_details) else {
        return failure;
    };
    let details = match failure.technical_details() {
        Some(details) => format!("{} (Content-Type: {})", details, mismatch),
        None => format!("Content-Type: {}", mismatch),
    };
    failure.with_details(details)
}

/// Result of client-server discovery
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientServerInfo {
    /// Raw `/.well-known/matrix/client` body
    pub well_known: Option<Value>,
    /// `m.homeserver.base_url`, trailing slashes stripped
    pub base_url: Option<String>,
    /// Raw `/_matrix/client/versions` body
    pub versions: Option<Value>,
}

impl ClientServerInfo {
    /// Spec versions advertised by the homeserver
    pub fn supported_versions(&self) -> Vec<&str> {
        self.versions
            .as_ref()
            .and_then(|v| v.get("versions"))
            .and_then(Value::as_array)
            .map(|versions| versions.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Well-known discovery followed by the versions lookup
#[derive(Debug, Clone)]
pub struct ClientServerDiscovery {
    client: ProbeClient,
    config: ProbeConfig,
}

impl ClientServerDiscovery {
    pub fn new(client: ProbeClient, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    /// Run discovery for `server`, publishing each completed step
    pub async fn discover(
        &self,
        server: &str,
        reporter: &StepReporter<ClientServerInfo>,
    ) -> SequenceOutcome<ClientServerInfo> {
        let mut outcome = SequenceOutcome::default();

        let well_known_url = self.config.well_known_client_url(server);
        let well_known =
            match fetch_json(&self.client, &self.config, ProbeStep::WellKnown, &well_known_url)
                .await
            {
                Ok(fetched) => fetched.body,
                Err(failure) => {
                    outcome.record(ProbeStep::WellKnown, failure);
                    return outcome;
                }
            };

        let base_url = Self::base_url(&well_known, &well_known_url);
        let mut info = ClientServerInfo {
            well_known: Some(well_known),
            ..ClientServerInfo::default()
        };
        let base_url = match base_url {
            Ok(base_url) => base_url,
            Err(failure) => {
                outcome.data = Some(info);
                outcome.record(ProbeStep::WellKnown, failure);
                return outcome;
            }
        };
        tracing::debug!("{} delegates client-server API to {}", server, base_url);
        info.base_url = Some(base_url.clone());
        outcome.data = Some(info);
        reporter.publish(&outcome);

        let versions_url = versions_url(&base_url);
        let versions = fetch_json(&self.client, &self.config, ProbeStep::Versions, &versions_url)
            .await
            .and_then(|fetched| {
                match check_shape(&fetched.body, &[VERSIONS_PATH], &versions_url) {
                    Some(failure) => Err(failure),
                    None => Ok(fetched.body),
                }
            });
        match versions {
            Ok(body) => {
                if let Some(info) = outcome.data.as_mut() {
                    info.versions = Some(body);
                }
            }
            Err(failure) => {
                outcome.record(ProbeStep::Versions, failure);
                return outcome;
            }
        }

        if self.config.check_cors() {
            if let Some(failure) = self.preflight(&versions_url).await {
                outcome.record(ProbeStep::CorsPreflight, failure);
            }
        }

        outcome
    }

    /// `m.homeserver.base_url` from the well-known body
    fn base_url(body: &Value, endpoint: &str) -> Result<String, ProbeFailure> {
        if let Some(failure) = check_shape(body, &[BASE_URL_PATH], endpoint) {
            return Err(failure);
        }

        body.get("m.homeserver")
            .and_then(|homeserver| homeserver.get("base_url"))
            .and_then(Value::as_str)
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .ok_or_else(|| {
                ProbeFailure::new(ErrorKind::InvalidResponse, "errors.invalidResponse")
                    .with_details("m.homeserver.base_url must be a non-empty string")
                    .with_endpoint(endpoint)
            })
    }

    async fn preflight(&self, url: &str) -> Option<ProbeFailure> {
        match self
            .client
            .preflight(url, self.config.preflight_origin())
            .await
        {
            Ok(response) => check_preflight(&response),
            Err(failure) => Some(failure),
        }
    }
}

impl ProbeSequence for ClientServerDiscovery {
    type Data = ClientServerInfo;

    fn run(
        self: Arc<Self>,
        target: String,
        reporter: StepReporter<ClientServerInfo>,
    ) -> BoxFuture<'static, SequenceOutcome<ClientServerInfo>> {
        async move { self.discover(&target, &reporter).await }.boxed()
    }
}

/// One contact from `/.well-known/matrix/support`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default)]
    pub role: String,
}

/// `/.well-known/matrix/support` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportInfo {
    #[serde(default)]
    pub contacts: Vec<SupportContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_page: Option<String>,
}

/// Support-info lookup.
///
/// A content-type mismatch is tolerated: the warning is recorded under the
/// `support` slot and the body is still parsed, so the outcome carries both.
#[derive(Debug, Clone)]
pub struct SupportInfoDiscovery {
    client: ProbeClient,
    config: ProbeConfig,
}

impl SupportInfoDiscovery {
    pub fn new(client: ProbeClient, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    pub async fn discover(&self, server: &str) -> SequenceOutcome<SupportInfo> {
        let mut outcome = SequenceOutcome::default();
        let url = self.config.well_known_support_url(server);

        let fetched = match fetch_json(&self.client, &self.config, ProbeStep::Support, &url).await
        {
            Ok(fetched) => fetched,
            Err(failure) => {
                outcome.record(ProbeStep::Support, failure);
                return outcome;
            }
        };

        let warning = fetched.warning;
        if warning.is_some() {
            tracing::debug!(
                "{} served support info as {:?}",
                server,
                fetched.response.content_type()
            );
        }

        let parsed = match check_shape(&fetched.body, &[], &url) {
            Some(failure) => Err(failure),
            None => serde_json::from_value::<SupportInfo>(fetched.body).map_err(|err| {
                ProbeFailure::new(ErrorKind::InvalidResponse, "errors.invalidResponse")
                    .with_details(err.to_string())
                    .with_endpoint(url.clone())
            }),
        };

        match parsed {
            Ok(info) => {
                outcome.data = Some(info);
                if let Some(warning) = warning {
                    outcome.record(ProbeStep::Support, warning);
                }
            }
            Err(failure) => {
                outcome.record(ProbeStep::Support, note_warning(failure, warning.as_ref()))
            }
        }
        outcome
    }
}

impl ProbeSequence for SupportInfoDiscovery {
    type Data = SupportInfo;

    fn run(
        self: Arc<Self>,
        target: String,
        _reporter: StepReporter<SupportInfo>,
    ) -> BoxFuture<'static, SequenceOutcome<SupportInfo>> {
        async move { self.discover(&target).await }.boxed()
    }
}
