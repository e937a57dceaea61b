//! relay-rs: validating relay for the deep research webhook
//!
//! Accepts `POST /api/search` with `{"query": "..."}`, forwards the query
//! to the configured research webhook and always answers with a JSON array
//! of `{output, output_html}` records.
//!
//! # Failure mapping
//!
//! - invalid body: 400 with field-level `errors`
//! - webhook unreachable: 503, message names the webhook URL
//! - webhook error status, timeout, cut-off or malformed reply: 502
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//! mode = "production"
//!
//! [upstream]
//! webhook_url = "http://127.0.0.1:5678/webhook/search"
//! timeout_seconds = 120
//! ```
//!
//! `N8N_WEBHOOK_URL`, `PORT` and `NODE_ENV` override the file.

pub mod config;
pub mod error;
pub mod relay;
pub mod upstream;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use relay::RelayServer;
