//! Instrumented HTTP Demo Service
//!
//! A small HTTP service built with Tokio and Axum whose core is the
//! request instrumentation layer.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 DEMO SERVICE                 │
//!                     │                                              │
//!   Client Request    │  ┌─────────┐    ┌────────────┐   ┌────────┐ │
//!   ──────────────────┼─▶│  http   │───▶│ middleware │──▶│handlers│ │
//!                     │  │ server  │    │ instrument │   │ / err  │ │
//!                     │  └─────────┘    └─────┬──────┘   │  slow  │ │
//!                     │                       │          └────────┘ │
//!                     │                       ▼                     │
//!                     │  ┌────────────────────────────────────────┐ │
//!                     │  │            observability               │ │
//!                     │  │  metrics (Prometheus) │ tracing (OTLP) │ │
//!                     │  └────────────────────────────────────────┘ │
//!                     │                                              │
//!                     │  ┌─────────┐  ┌───────────────────────────┐ │
//!                     │  │ config  │  │         lifecycle         │ │
//!                     │  │         │  │   signals / shutdown      │ │
//!                     │  └─────────┘  └───────────────────────────┘ │
//!                     └──────────────────────────────────────────────┘
//! ```
//!
//! Startup order: config, logging, metrics registry, trace exporter,
//! listener, server. Shutdown order: drain connections, then flush the
//! trace exporter within its deadline.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use demo_app::config::{self, AppConfig};
use demo_app::http::HttpServer;
use demo_app::lifecycle::{wait_for_signal, Shutdown};
use demo_app::observability::logging;
use demo_app::observability::metrics::HttpMetrics;
use demo_app::observability::tracing::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match std::env::var("CONFIG_PATH") {
        Ok(path) => config::load_config(Path::new(&path))?,
        Err(_) => AppConfig::default(),
    };
    config::apply_env_overrides(&mut config)?;

    logging::init(&config.observability.log_level);

    tracing::info!("demo-app v0.1.0 starting");
    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        tracing_enabled = config.tracing.enabled,
        "configuration loaded"
    );

    // Duplicate metric registration is a programming error; fail startup.
    let metrics = Arc::new(HttpMetrics::new()?);
    let tracer = init_tracing(&config.tracing)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(
        &config,
        Arc::clone(&metrics),
        tracer.as_ref().map(|handle| handle.tracer().clone()),
    );
    server.run(listener, shutdown.subscribe()).await?;

    if let Some(handle) = tracer {
        handle
            .shutdown(Duration::from_secs(config.tracing.shutdown_timeout_secs))
            .await;
    }

    tracing::info!("shutdown complete");
    Ok(())
}
