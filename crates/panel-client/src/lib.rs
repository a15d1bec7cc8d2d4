//! Expert Panel Client Host Layer
//!
//! Everything the core leaves to its host:
//! - [`HttpBackend`]: the backend contract over HTTP (reqwest)
//! - [`ClientConfig`]: environment and TOML configuration
//! - [`CertificationPoller`]: periodic certification refresh
//! - [`render`]: pure state → markup / chart-config adapters
//! - [`telemetry`]: tracing subscriber setup
//!
//! # Usage
//!
//! ```ignore
//! panel_client::telemetry::init();
//! let config = ClientConfig::default();
//! let ctx = panel_client::connect(&config)?;
//! let poller = config
//!     .poll_interval
//!     .map(|every| CertificationPoller::spawn(ctx.clone(), every, CancellationToken::new()));
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod http;
pub mod poller;
pub mod render;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use coordination::{AppContext, SharedAppContext};

pub use config::ClientConfig;
pub use http::HttpBackend;
pub use poller::CertificationPoller;
pub use render::{EscapingRenderer, MarkdownRenderer};

/// Build an application context talking to the configured backend.
pub fn connect(config: &ClientConfig) -> Result<SharedAppContext> {
    let backend = HttpBackend::new(config.clone())?;
    tracing::info!(base_url = %config.base_url, "Panel client configured");
    Ok(AppContext::new(Arc::new(backend))
        .with_force_retrain(config.force_retrain)
        .shared())
}
