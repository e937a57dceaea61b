//! Configuration for relay-rs
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `RELAY__*` environment variables, then the plain `N8N_WEBHOOK_URL`,
//! `PORT` and `NODE_ENV` variables.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RelayError, Result};

/// Variable holding the research webhook address
pub const WEBHOOK_URL_VAR: &str = "N8N_WEBHOOK_URL";
/// Variable overriding the listen port
pub const PORT_VAR: &str = "PORT";
/// Variable naming the runtime mode
pub const MODE_VAR: &str = "NODE_ENV";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MODE: &str = "development";
const DEFAULT_TIMEOUT_SECONDS: i64 = 120;

/// Main relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Research webhook configuration
    pub upstream: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Runtime mode ("development", "production", ...). Only affects logging.
    pub mode: String,
}

/// Research webhook configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Webhook URL receiving `{query}` POSTs
    #[serde(default)]
    pub webhook_url: String,
    /// Outbound request timeout in seconds
    pub timeout_seconds: u64,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.mode.eq_ignore_ascii_case("production")
    }
}

impl RelayConfig {
    /// Load from the process environment and an optional config file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_sources(path, std::env::vars().collect())
    }

    /// Load from an explicit set of environment variables
    pub fn from_sources(path: Option<&Path>, vars: HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.mode", DEFAULT_MODE)?
            .set_default("upstream.timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: RelayConfig = builder
            .add_source(
                Environment::with_prefix("RELAY")
                    .separator("__")
                    .source(Some(vars.clone())),
            )
            .set_override_option("upstream.webhook_url", vars.get(WEBHOOK_URL_VAR).cloned())?
            .set_override_option("server.port", vars.get(PORT_VAR).cloned())?
            .set_override_option("server.mode", vars.get(MODE_VAR).cloned())?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let webhook_url = self.upstream.webhook_url.trim();
        if webhook_url.is_empty() {
            return Err(RelayError::Config(format!(
                "{} environment variable is required",
                WEBHOOK_URL_VAR
            )));
        }

        let parsed = url::Url::parse(webhook_url).map_err(|e| {
            RelayError::Config(format!("Invalid webhook URL '{}': {}", webhook_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "Webhook URL must use http or https: {}",
                webhook_url
            )));
        }

        if self.upstream.timeout_seconds == 0 {
            return Err(RelayError::Config(
                "upstream.timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
