//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (request counter + latency histogram)
//!     → tracing.rs (server spans exported over OTLP)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape of /metrics)
//!     → Trace collector (OTLP/HTTP, e.g. Tempo)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments per label cell)
//! - Trace export is batched and never blocks request handling
//! - Span export failures stay inside the exporter; requests never see them

pub mod logging;
pub mod metrics;
pub mod tracing;

use thiserror::Error;

/// Errors raised while bringing up the telemetry pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OTLP span exporter could not be constructed (bad endpoint URL,
    /// malformed configuration).
    #[error("failed to build OTLP span exporter: {0}")]
    Exporter(#[from] opentelemetry::trace::TraceError),
}
