//! Per-route request instrumentation.
//!
//! # Responsibilities
//! - Measure wall-clock latency for every request
//! - Open a server span (when tracing is enabled) and end it exactly once
//! - Record the request counter and latency histogram with consistent labels
//!
//! # Design Decisions
//! - Applied per route with a static route label, so label cardinality is
//!   fixed at wiring time
//! - Finalization lives in a drop guard; a request that never produces a
//!   response (client gone, task aborted) is still counted and its span
//!   still ends
//! - The span context travels in the request extensions so handlers can
//!   attach children explicitly

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::Tracer;

use crate::http::middleware::status::StatusRecorder;
use crate::observability::metrics::HttpMetrics;

/// Shared instrumentation dependencies, fixed at startup.
#[derive(Clone)]
pub struct Instrumentation {
    metrics: Arc<HttpMetrics>,
    tracer: Option<Tracer>,
}

impl Instrumentation {
    /// `tracer` is `None` when span export is disabled; the wrapper then
    /// records metrics only.
    pub fn new(metrics: Arc<HttpMetrics>, tracer: Option<Tracer>) -> Self {
        Self { metrics, tracer }
    }

    /// Bind these dependencies to one route label.
    pub fn route(&self, route: &'static str) -> RouteInstrument {
        RouteInstrument {
            inner: self.clone(),
            route,
        }
    }
}

/// Middleware state for a single instrumented route.
#[derive(Clone)]
pub struct RouteInstrument {
    inner: Instrumentation,
    route: &'static str,
}

/// Instrumentation middleware, applied per route via
/// `axum::middleware::from_fn_with_state`.
pub async fn instrument(
    State(st): State<RouteInstrument>,
    mut req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let recorder = StatusRecorder::new();
    req.extensions_mut().insert(recorder.clone());

    let cx = st.inner.tracer.as_ref().map(|tracer| {
        let span = tracer
            .span_builder(format!("{} {}", method, st.route))
            .with_kind(SpanKind::Server)
            .with_attributes([
                KeyValue::new("http.method", method.to_string()),
                KeyValue::new("http.route", st.route),
                KeyValue::new("http.target", req.uri().path().to_string()),
            ])
            .start(tracer);
        Context::current_with_span(span)
    });
    if let Some(cx) = &cx {
        req.extensions_mut().insert(cx.clone());
    }

    let mut guard = RequestGuard {
        started: Instant::now(),
        method,
        route: st.route,
        metrics: Arc::clone(&st.inner.metrics),
        recorder: recorder.clone(),
        cx,
        finished: false,
    };

    let response = next.run(req).await;

    // The real response status is the final write; it wins over anything
    // the handler reported through the recorder.
    recorder.set(response.status());
    guard.finish();
    response
}

/// Finalizes one request: metrics, span status, span end.
///
/// `finish` runs at most once; the `Drop` impl covers exit paths that
/// never reach the explicit call.
struct RequestGuard {
    started: Instant,
    method: Method,
    route: &'static str,
    metrics: Arc<HttpMetrics>,
    recorder: StatusRecorder,
    cx: Option<Context>,
    finished: bool,
}

impl RequestGuard {
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let elapsed = self.started.elapsed().as_secs_f64();
        // Single read; the counter label and the span status always agree.
        let status = self.recorder.recorded();

        self.metrics
            .record_latency(self.method.as_str(), self.route, elapsed);
        self.metrics
            .record_request(self.method.as_str(), self.route, status);

        if let Some(cx) = &self.cx {
            let span = cx.span();
            span.set_attribute(KeyValue::new(
                "http.status_code",
                i64::from(status.as_u16()),
            ));
            if status.as_u16() >= 500 {
                span.set_status(Status::error("server error"));
            } else {
                span.set_status(Status::Ok);
            }
            span.end();
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.finish();
    }
}
