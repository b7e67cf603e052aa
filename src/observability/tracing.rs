//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP/HTTP span export pipeline at startup
//! - Hand out the tracer used by the request instrumentation
//! - Flush and shut the exporter down within a bounded time
//!
//! # Design Decisions
//! - Batch export on the Tokio runtime; spans buffer locally and export in
//!   the background, so an unreachable collector never blocks requests
//! - Startup does not probe the collector; a bad endpoint only surfaces as
//!   export errors inside the SDK
//! - Shutdown flush runs on a blocking thread raced against a timeout; on
//!   expiry the remaining spans are dropped

use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};

use crate::config::TracingConfig;
use crate::observability::TelemetryError;

/// Handle to the installed trace pipeline.
///
/// Owns the provider so the process can flush and shut it down; the tracer
/// is what request instrumentation clones.
pub struct TracerHandle {
    provider: TracerProvider,
    tracer: Tracer,
}

/// Install the OTLP trace pipeline.
///
/// Returns `None` when tracing is disabled in config; the instrumentation
/// then records metrics only.
pub fn init_tracing(config: &TracingConfig) -> Result<Option<TracerHandle>, TelemetryError> {
    if !config.enabled {
        tracing::info!("tracing disabled, spans will not be exported");
        return Ok(None);
    }

    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(config.endpoint.clone())
        .build()?;

    let provider = TracerProvider::builder()
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]))
        .with_batch_exporter(exporter, runtime::Tokio)
        .build();

    global::set_tracer_provider(provider.clone());
    let tracer = provider.tracer(config.service_name.clone());

    tracing::info!(
        endpoint = %config.endpoint,
        service_name = %config.service_name,
        "trace exporter initialized"
    );

    Ok(Some(TracerHandle { provider, tracer }))
}

impl TracerHandle {
    /// The tracer handed to the request instrumentation.
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Flush buffered spans and shut the exporter down.
    ///
    /// Returns at or before `timeout`. Spans still buffered when the
    /// deadline passes are dropped; losing a tail of spans is preferable to
    /// hanging process exit on an unreachable collector.
    pub async fn shutdown(self, timeout: Duration) {
        let provider = self.provider;
        let flush = tokio::task::spawn_blocking(move || {
            for result in provider.force_flush() {
                if let Err(err) = result {
                    tracing::warn!(error = %err, "failed to flush buffered spans");
                }
            }
            provider.shutdown()
        });

        match tokio::time::timeout(timeout, flush).await {
            Ok(Ok(Ok(()))) => tracing::info!("trace exporter shut down"),
            Ok(Ok(Err(err))) => {
                tracing::warn!(error = %err, "trace exporter shutdown reported an error");
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "trace exporter shutdown task failed");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "trace exporter shutdown timed out, dropping buffered spans"
                );
            }
        }
    }
}
