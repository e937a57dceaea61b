//! HTTP client for the search relay

use anyhow::{bail, Context, Result};
use research_core::schema::{validate_search_response, FieldViolation, SearchRequest, SearchResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Error body returned by the relay
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<FieldViolation>,
}

pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Submit a query. The request is validated before anything is sent.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;

        let url = format!("{}/api/search", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Could not reach the relay at {}", self.base_url))?;

        let status = response.status();
        let text = response.text().await.context("Failed to read relay response")?;

        if !status.is_success() {
            let Ok(body) = serde_json::from_str::<ErrorBody>(&text) else {
                bail!("Relay responded with HTTP {}: {}", status.as_u16(), text);
            };
            if body.errors.is_empty() {
                bail!("{} (HTTP {})", body.message, status.as_u16());
            }
            let details = body
                .errors
                .iter()
                .map(|v| format!("{}: {}", v.field, v.message))
                .collect::<Vec<_>>()
                .join(", ");
            bail!("{} ({})", body.message, details);
        }

        let value: Value = serde_json::from_str(&text).context("Relay returned invalid JSON")?;
        Ok(validate_search_response(&value)?)
    }
}
