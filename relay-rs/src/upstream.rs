//! Client for the external research webhook
//!
//! One POST per search, no retries. Transport failures are classified so
//! the relay can tell an unreachable service from a slow or failing one.

use research_core::schema::SearchRequest;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{RelayError, Result};

/// Longest upstream error body echoed into the logs
const LOGGED_BODY_LIMIT: usize = 500;

/// HTTP client bound to a single webhook URL
pub struct WebhookClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward a validated request and decode the JSON reply as-is
    pub async fn search(&self, request: &SearchRequest) -> Result<Value> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_send(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Research service {} responded with HTTP {}: {}",
                self.endpoint,
                status,
                body.chars().take(LOGGED_BODY_LIMIT).collect::<String>()
            );
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify_body(e))?;
        serde_json::from_slice(&body).map_err(|e| {
            RelayError::InvalidUpstreamResponse(format!("body is not valid JSON: {}", e))
        })
    }

    /// Failures before a status line was received
    fn classify_send(&self, e: reqwest::Error) -> RelayError {
        if e.is_builder() {
            RelayError::Internal(format!("Failed to build upstream request: {}", e))
        } else if e.is_timeout() {
            self.timeout_error()
        } else if e.is_connect() || e.is_request() {
            warn!("Research service {} unreachable: {}", self.endpoint, e);
            RelayError::ServiceUnavailable {
                endpoint: self.endpoint.clone(),
            }
        } else {
            RelayError::InvalidUpstreamResponse(e.to_string())
        }
    }

    /// Failures while reading a body after a success status
    fn classify_body(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            self.timeout_error()
        } else {
            warn!("Research service {} body read failed: {}", self.endpoint, e);
            RelayError::InvalidUpstreamResponse(format!("body could not be read: {}", e))
        }
    }

    fn timeout_error(&self) -> RelayError {
        RelayError::UpstreamTimeout {
            endpoint: self.endpoint.clone(),
            seconds: self.timeout.as_secs(),
        }
    }
}
