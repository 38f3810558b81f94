//! Heartz Monitor - health and Kafka lag dashboard
//!
//! Polls a health-check endpoint and a fixed set of lag endpoints on every
//! page load and renders the combined status.

mod config;
mod fetch;
mod monitor;
mod web;

use config::MonitorConfig;
use fetch::HttpSource;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("heartz_monitor=info".parse()?))
        .init();

    // Load configuration
    let cfg = MonitorConfig::load()?;
    tracing::info!("Starting Heartz Monitor on port {}...", cfg.http_port);

    let source = Arc::new(HttpSource::new(&cfg.monitor_url, &cfg.lag_base_url, cfg.fetch_timeout)?);
    tracing::info!(
        "Monitoring {} and {} lag endpoints under {}",
        source.monitor_url(),
        cfg.endpoint_count,
        cfg.lag_base_url
    );
    if cfg.password.is_none() {
        tracing::warn!("HEARTZ_PASSWORD is not set; the dashboard is open to anyone");
    }

    // Start web server
    let server = Server::new(cfg, source);
    server.start().await?;

    Ok(())
}
