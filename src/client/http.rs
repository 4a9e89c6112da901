/**
 * HTTP Probe Helper
 *
 * Wraps a single timed GET (or CORS preflight) against a probe target and
 * normalizes the outcome into a discriminated result:
 *
 * - `Ok(ProbeResponse)` for *any* completed HTTP exchange, including 4xx and
 *   5xx statuses. Judging the status is the validator's job, not ours.
 * - `Err(ProbeFailure)` when no response was obtained at all (timeout, TLS,
 *   DNS, refused connection), classified by `client::classifier`.
 *
 * # Credentials
 *
 * The underlying client has no cookie store and requests carry no auth
 * headers, so an authentication problem can never masquerade as a CORS or
 * network failure.
 *
 * # Bodies
 *
 * The body is read eagerly as text so that every later check is a pure
 * function over already-fetched data.
 */

use crate::client::classifier::{classify_failure, TransportFailure};
use crate::shared::ProbeFailure;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::time::Duration;

/// Origin sent with emulated CORS preflights when none is configured
pub const DEFAULT_PREFLIGHT_ORIGIN: &str = "https://federationtester.invalid";

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Requested URL
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased; repeated headers are joined with ", "
    pub headers: BTreeMap<String, String>,
    /// Raw body text
    pub body: String,
}

impl ProbeResponse {
    /// Build a response by hand (fixtures, tests)
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of a single probe request
pub type ProbeResult = Result<ProbeResponse, ProbeFailure>;

/// HTTP client used by every probe
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    timeout: Duration,
}

impl ProbeClient {
    /// Create a probe client whose requests abort after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// GET `url`, aborting after the configured timeout
    pub async fn get(&self, url: &str) -> ProbeResult {
        self.get_with_timeout(url, self.timeout).await
    }

    /// GET `url`, aborting after `timeout`
    pub async fn get_with_timeout(&self, url: &str, timeout: Duration) -> ProbeResult {
        tracing::debug!("Probing GET {}", url);
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(timeout);
        self.complete(url, request).await
    }

    /// Send a CORS preflight for a GET on `url`
    pub async fn preflight(&self, url: &str, origin: &str) -> ProbeResult {
        tracing::debug!("Probing OPTIONS {} (origin {})", url, origin);
        let request = self
            .client
            .request(Method::OPTIONS, url)
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "GET")
            .header("Access-Control-Request-Headers", "authorization")
            .timeout(self.timeout);
        self.complete(url, request).await
    }

    async fn complete(&self, url: &str, request: reqwest::RequestBuilder) -> ProbeResult {
        let response = request
            .send()
            .await
            .map_err(|e| classify_failure(&TransportFailure::from_reqwest(e), url))?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| classify_failure(&TransportFailure::from_reqwest(e), url))?;

        tracing::debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(ProbeResponse {
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }
}

impl Default for ProbeClient {
    fn default() -> Self {
        Self::new(crate::shared::config::DEFAULT_REQUEST_TIMEOUT)
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}
