//! ViaggiaTreno HTTP client.
//!
//! The fetchers only need "GET this path, give me status and body", so the
//! client sits behind the [`Transport`] trait and tests swap in
//! [`StubTransport`](super::StubTransport).

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::error::{Endpoint, FetchCause, FetchError};

/// Default base URL for the ViaggiaTreno REST API.
pub const DEFAULT_BASE_URL: &str =
    "http://www.viaggiatreno.it/infomobilita/resteasy/viaggiatreno";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// What a board fetch does when one direction answers with a non-200 status.
///
/// Transport errors, timeouts and undecodable bodies always abort the whole
/// board; this only covers a clean response with a bad status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatusPolicy {
    /// Fail the board, naming the direction
    #[default]
    Fail,
    /// Leave that direction empty and keep the other one
    Skip,
}

/// A raw upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Request/response access to the upstream API.
///
/// `path` is relative to the base URL, e.g. `arrivi/S08409/<timestamp>`.
/// Failures before a status is known (connect, timeout, body read) come back
/// as a [`FetchCause`]; the caller attaches the endpoint.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<RawResponse, FetchCause>> + Send;
}

/// GET `path` and require a 200.
pub(crate) async fn get_ok<T: Transport>(
    transport: &T,
    endpoint: Endpoint,
    path: &str,
) -> Result<String, FetchError> {
    let response = transport
        .get(path)
        .await
        .map_err(|cause| FetchError::failed(endpoint, cause))?;

    if !response.is_ok() {
        return Err(FetchError::failed(
            endpoint,
            FetchCause::Status(response.status),
        ));
    }

    Ok(response.body)
}

/// Configuration for the ViaggiaTreno client.
#[derive(Debug, Clone)]
pub struct ViaggiaTrenoConfig {
    /// Base URL for the API (defaults to production ViaggiaTreno)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Handling of non-200 board responses
    pub status_policy: BoardStatusPolicy,
}

impl ViaggiaTrenoConfig {
    /// Create a config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            status_policy: BoardStatusPolicy::default(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the non-200 board policy.
    pub fn with_status_policy(mut self, policy: BoardStatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }
}

impl Default for ViaggiaTrenoConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// ViaggiaTreno API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ViaggiaTrenoClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaggiaTrenoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ViaggiaTrenoConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Transport for ViaggiaTrenoClient {
    async fn get(&self, path: &str) -> Result<RawResponse, FetchCause> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self.http.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(%url, status, bytes = body.len(), "response");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ViaggiaTrenoConfig::new()
            .with_base_url("http://localhost:8080/")
            .with_timeout(3)
            .with_status_policy(BoardStatusPolicy::Skip);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.status_policy, BoardStatusPolicy::Skip);
    }

    #[test]
    fn config_defaults() {
        let config = ViaggiaTrenoConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.status_policy, BoardStatusPolicy::Fail);
    }

    #[test]
    fn client_builds_urls() {
        let config = ViaggiaTrenoConfig::new().with_base_url("http://localhost:8080");
        let client = ViaggiaTrenoClient::new(&config).unwrap();
        assert_eq!(
            client.url("cercaNumeroTrenoTrenoAutocomplete/9650"),
            "http://localhost:8080/cercaNumeroTrenoTrenoAutocomplete/9650"
        );
    }

    #[test]
    fn policy_deserializes_lowercase() {
        let policy: BoardStatusPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, BoardStatusPolicy::Skip);
    }

    // Live API tests would go here; they hit the public endpoint and are
    // best run by hand.
}
