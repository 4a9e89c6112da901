//! Federation-report API client.
//!
//! Federation probing happens server-side in the external tester API; this
//! client only requests the report and checks it is a JSON object carrying
//! the overall `FederationOK` flag. The rest of the report is kept opaque.

use crate::client::config::ProbeConfig;
use crate::client::http::ProbeClient;
use crate::client::store::{ProbeSequence, SequenceOutcome, StepReporter};
use crate::client::validator::{check_shape, parse_json_body, validate_response, ValidationOptions};
use crate::shared::{ConfigError, ErrorKind, ProbeFailure, ProbeStep, UsageContext};
use futures_util::future::{BoxFuture, FutureExt};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const FEDERATION_OK_PATH: &[&str] = &["FederationOK"];

/// A federation report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationReport {
    /// Overall verdict of the tester API
    pub federation_ok: bool,
    /// Full report body as returned by the API
    pub report: Value,
}

impl FederationReport {
    /// Build a report from a parsed body
    pub fn from_value(report: Value, endpoint: &str) -> Result<Self, ProbeFailure> {
        if let Some(failure) = check_shape(&report, &[FEDERATION_OK_PATH], endpoint) {
            return Err(failure);
        }
        let federation_ok = report
            .get("FederationOK")
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                ProbeFailure::new(ErrorKind::InvalidResponse, "errors.invalidResponse")
                    .with_details("FederationOK must be a boolean")
                    .with_endpoint(endpoint)
            })?;
        Ok(Self {
            federation_ok,
            report,
        })
    }
}

/// Client for the federation-report API
#[derive(Debug, Clone)]
pub struct FederationClient {
    client: ProbeClient,
    report_url: Url,
}

impl FederationClient {
    /// Fails when no API base URL is configured
    pub fn new(client: ProbeClient, config: &ProbeConfig) -> Result<Self, ConfigError> {
        let raw = config.federation_report_url()?;
        let report_url = Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl(raw))?;
        Ok(Self { client, report_url })
    }

    /// Report URL for `server_name`
    pub fn report_url(&self, server_name: &str, stats_opt_in: bool) -> String {
        let mut url = self.report_url.clone();
        url.query_pairs_mut()
            .append_pair("server_name", server_name)
            .append_pair("stats_opt_in", if stats_opt_in { "true" } else { "false" })
            .append_pair("no_cache", "true");
        url.into()
    }

    pub async fn fetch_report(
        &self,
        server_name: &str,
        stats_opt_in: bool,
    ) -> Result<FederationReport, ProbeFailure> {
        let url = self.report_url(server_name, stats_opt_in);
        let response = self.client.get(&url).await?;

        if let Some(failure) =
            validate_response(&response, &ValidationOptions::new(UsageContext::Federation))
        {
            return Err(failure);
        }
        let body = parse_json_body(&response)?;
        let report = FederationReport::from_value(body, &url)?;

        tracing::info!(
            server_name,
            federation_ok = report.federation_ok,
            "Federation report received"
        );
        Ok(report)
    }
}

/// Federation report as a store sequence
#[derive(Debug, Clone)]
pub struct FederationReportSequence {
    client: FederationClient,
    stats_opt_in: bool,
}

impl FederationReportSequence {
    pub fn new(client: FederationClient, stats_opt_in: bool) -> Self {
        Self {
            client,
            stats_opt_in,
        }
    }
}

impl ProbeSequence for FederationReportSequence {
    type Data = FederationReport;

    fn run(
        self: Arc<Self>,
        target: String,
        _reporter: StepReporter<FederationReport>,
    ) -> BoxFuture<'static, SequenceOutcome<FederationReport>> {
        async move {
            match self.client.fetch_report(&target, self.stats_opt_in).await {
                Ok(report) => SequenceOutcome::with_data(report),
                Err(failure) => {
                    let mut outcome = SequenceOutcome::default();
                    outcome.record(ProbeStep::FederationReport, failure);
                    outcome
                }
            }
        }
        .boxed()
    }
}
