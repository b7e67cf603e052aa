//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the demo routes and /metrics
//! - Wire the per-route instrumentation middleware
//! - Apply shared middleware (request timeout, trace logging)
//! - Serve with graceful shutdown driven by the lifecycle coordinator

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use opentelemetry_sdk::trace::Tracer;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::middleware::{instrument, Instrumentation};
use crate::observability::metrics::HttpMetrics;

/// State injected into the /metrics handler.
#[derive(Clone)]
struct AppState {
    metrics: Arc<HttpMetrics>,
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the server from config and the shared telemetry handles.
    pub fn new(config: &AppConfig, metrics: Arc<HttpMetrics>, tracer: Option<Tracer>) -> Self {
        let instrumentation = Instrumentation::new(Arc::clone(&metrics), tracer);
        let router = Self::build_router(config, instrumentation, metrics);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The demo routes accept any method; the wrapper labels by whatever
    /// method arrives. /metrics is deliberately not instrumented so scrapes
    /// do not show up in the numbers they collect.
    fn build_router(config: &AppConfig, instr: Instrumentation, metrics: Arc<HttpMetrics>) -> Router {
        let mut router = Router::new()
            .route(
                "/",
                any(handlers::root).layer(from_fn_with_state(instr.route("root"), instrument)),
            )
            .route(
                "/error",
                any(handlers::error).layer(from_fn_with_state(instr.route("error"), instrument)),
            )
            .route(
                "/slow",
                any(handlers::slow).layer(from_fn_with_state(instr.route("slow"), instrument)),
            );

        if config.observability.metrics_enabled {
            router = router.route("/metrics", get(metrics_handler));
        }

        router
            .with_state(AppState { metrics })
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Prometheus text exposition.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
