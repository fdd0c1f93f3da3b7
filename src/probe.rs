//! Startup probe — one-shot fetch of the backend's `/test` payload.
//!
//! DESIGN
//! ======
//! At boot the service issues a single `GET {VERITAS_API_URL}/test` and keeps
//! the decoded payload for the widget header. Any failure (no base URL,
//! network error, undecodable body) is logged and the state simply stays
//! `Loading`. There is no retry and no request timeout.
//!
//! The result is published on a `watch` channel so widgets that connected
//! while the fetch was in flight see the payload the moment it lands.
//!
//! The HTTP call sits behind `TestEndpoint` so tests can swap in a canned
//! endpoint; body decoding lives in `parse_test_payload`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::state::AppState;

pub const LOADING_TEXT: &str = "Loading...";

// =============================================================================
// TYPES
// =============================================================================

/// K-sortable id as reported by the backend, all parts pre-rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ksuid {
    pub string: String,
    pub timestamp: String,
    pub payload: String,
}

/// Body of `GET /test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPayload {
    pub message: String,
    pub ksuid: Ksuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ProbeState {
    #[default]
    Loading,
    Loaded(TestPayload),
}

impl ProbeState {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, ProbeState::Loaded(_))
    }

    /// Lines shown above the chat widget.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        match self {
            ProbeState::Loading => vec![LOADING_TEXT.to_string()],
            ProbeState::Loaded(data) => vec![
                format!("Message: {}", data.message),
                format!("Timestamp: {}", data.ksuid.timestamp),
                format!("Payload: {}", data.ksuid.payload),
                format!("KSUID: {}", data.ksuid.string),
            ],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe base URL not configured")]
    NotConfigured,
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid payload: {0}")]
    Parse(String),
}

// =============================================================================
// ENDPOINT
// =============================================================================

#[async_trait]
pub trait TestEndpoint: Send + Sync {
    async fn fetch_test(&self) -> Result<TestPayload, ProbeError>;
}

pub struct HttpTestEndpoint {
    http: reqwest::Client,
    url: String,
}

impl HttpTestEndpoint {
    /// Endpoint for `{base_url}/test`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProbeError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: test_url(base_url) })
    }
}

#[async_trait]
impl TestEndpoint for HttpTestEndpoint {
    async fn fetch_test(&self) -> Result<TestPayload, ProbeError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        // Status is not checked: whatever body comes back either decodes or
        // it does not.
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProbeError::Request(e.to_string()))?;
        info!(status, url = %self.url, "probe: response received");

        parse_test_payload(&text)
    }
}

fn test_url(base_url: &str) -> String {
    format!("{}/test", base_url.trim_end_matches('/'))
}

/// Decode a `/test` response body.
///
/// # Errors
///
/// Returns `ProbeError::Parse` if the body is not the expected JSON shape.
pub fn parse_test_payload(body: &str) -> Result<TestPayload, ProbeError> {
    serde_json::from_str(body).map_err(|e| ProbeError::Parse(e.to_string()))
}

// =============================================================================
// RUN
// =============================================================================

/// Fetch once and publish the result. Failures leave `slot` untouched and
/// wake nobody.
pub async fn run_startup_probe(endpoint: &dyn TestEndpoint, slot: &watch::Sender<ProbeState>) {
    match endpoint.fetch_test().await {
        Ok(data) => {
            info!(message = %data.message, ksuid = %data.ksuid.string, "probe: test payload loaded");
            slot.send_replace(ProbeState::Loaded(data));
        }
        Err(e) => {
            error!(error = %e, "probe: error fetching data");
        }
    }
}

/// Spawn the one-shot probe against the configured base URL.
pub fn spawn_startup_probe(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(base_url) = state.config.api_url.as_deref() else {
            warn!(error = %ProbeError::NotConfigured, "probe: VERITAS_API_URL unset, staying in loading state");
            return;
        };
        let endpoint = match HttpTestEndpoint::new(base_url) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!(error = %e, "probe: error fetching data");
                return;
            }
        };
        run_startup_probe(&endpoint, &state.probe).await;
    })
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod tests;
