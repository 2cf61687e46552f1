//! Health probes for external services.
//!
//! Every probe has a bounded timeout and degrades to a sentinel status
//! instead of failing: `200` with a `{status}` body reports that status,
//! `200` without one reports `unknown`, any other HTTP status reports
//! `down`, and a timeout or connection failure reports `unreachable`.

use crate::config::HealthEndpoint;
use opsdeck_core::errors::{ExError, ExErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const STATUS_DOWN: &str = "down";
pub const STATUS_UNREACHABLE: &str = "unreachable";
pub const STATUS_UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub name: String,
    pub url: String,
    pub status: String,
    pub http_status: Option<u16>,
    pub latency_ms: u64,
    pub detail: Option<String>,
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

#[derive(Clone)]
pub struct HealthChecker {
    client: reqwest::Client,
}

impl HealthChecker {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("opsdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::ExternalService)
                    .with_op("health_client")
                    .with_message(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Probe one endpoint. Never fails.
    pub async fn probe(&self, endpoint: &HealthEndpoint) -> ServiceHealth {
        let start = Instant::now();
        let mut request = self.client.get(&endpoint.url).timeout(endpoint.timeout());
        if let Some(token) = &endpoint.bearer_token {
            request = request.bearer_auth(token.expose());
        }

        let (status, http_status, detail) = match request.send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                // The body read shares the request timeout
                match response.json::<StatusBody>().await {
                    Ok(body) => (body.status, Some(200), None),
                    Err(e) if e.is_timeout() => {
                        (STATUS_UNREACHABLE.to_string(), Some(200), Some(e.to_string()))
                    }
                    Err(_) => (STATUS_UNKNOWN.to_string(), Some(200), None),
                }
            }
            Ok(response) => {
                let code = response.status().as_u16();
                (
                    STATUS_DOWN.to_string(),
                    Some(code),
                    Some(format!("HTTP {}", code)),
                )
            }
            Err(e) => (STATUS_UNREACHABLE.to_string(), None, Some(e.to_string())),
        };

        let health = ServiceHealth {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            status,
            http_status,
            latency_ms: start.elapsed().as_millis() as u64,
            detail,
        };
        tracing::debug!(
            op = "health_probe",
            service = %health.name,
            status = %health.status,
            latency_ms = health.latency_ms,
        );
        health
    }

    /// Probe all endpoints concurrently, preserving input order
    pub async fn probe_all(&self, endpoints: &[HealthEndpoint]) -> Vec<ServiceHealth> {
        futures::future::join_all(endpoints.iter().map(|e| self.probe(e))).await
    }
}
