//! relay-rs: Deep Research Relay Server
//!
//! Forwards search queries from the research UI to the external
//! research webhook.

use relay_rs::{RelayConfig, RelayServer};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "relay_rs=info,tower_http=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RELAY_CONFIG").ok())
        .map(PathBuf::from);

    let config = RelayConfig::load(config_path.as_deref());
    init_tracing(matches!(&config, Ok(c) if c.server.is_production()));

    info!("Starting relay-rs v{}", env!("CARGO_PKG_VERSION"));

    // Fail before binding when the webhook is not configured
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let server = RelayServer::new(config)?;
    server.run().await?;

    Ok(())
}
