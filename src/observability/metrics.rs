//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the request metrics (count by status, latency distribution)
//! - Expose a Prometheus-compatible text rendering for the `/metrics` route
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency by method, route
//!
//! # Design Decisions
//! - One registry owned by the process, injected where recording happens
//! - Route labels are static strings fixed at wiring time, so label
//!   cardinality is bounded by routes × methods × observed statuses
//! - Recording is atomic per label cell; no lock on the hot path

use axum::http::StatusCode;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Request metrics shared by all instrumented routes.
///
/// Cloning is not provided; the server holds it in an `Arc` and hands
/// references to the middleware state and the `/metrics` handler.
pub struct HttpMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl HttpMetrics {
    /// Create the registry and register both metric families.
    ///
    /// A duplicate metric name is a registration error; startup treats it
    /// as fatal.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status"],
        )?;

        // Default buckets (5ms .. 10s) cover both the instant handlers and
        // the slow route's 100-1500ms delay.
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "route"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
        })
    }

    /// Count one completed request.
    pub fn record_request(&self, method: &str, route: &str, status: StatusCode) {
        self.requests_total
            .with_label_values(&[method, route, status.as_str()])
            .inc();
    }

    /// Observe one request latency in seconds.
    pub fn record_latency(&self, method: &str, route: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[method, route])
            .observe(seconds);
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn counter_value(rendered: &str, needle: &str) -> u64 {
        rendered
            .lines()
            .find(|line| !line.starts_with('#') && line.contains(needle))
            .and_then(|line| line.split_whitespace().last())
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| panic!("no sample matching {needle} in:\n{rendered}"))
    }

    #[test]
    fn registers_both_metric_families() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record_request("GET", "root", StatusCode::OK);
        metrics.record_latency("GET", "root", 0.003);

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("# TYPE http_requests_total counter"));
        assert!(rendered.contains("# TYPE http_request_duration_seconds histogram"));
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let metrics = HttpMetrics::new().unwrap();
        let duplicate = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status"],
        )
        .unwrap();

        assert!(metrics.registry.register(Box::new(duplicate)).is_err());
    }

    #[test]
    fn counter_keyed_by_method_route_and_status() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record_request("GET", "root", StatusCode::OK);
        metrics.record_request("GET", "root", StatusCode::OK);
        metrics.record_request("GET", "error", StatusCode::INTERNAL_SERVER_ERROR);
        metrics.record_request("POST", "root", StatusCode::OK);

        let rendered = metrics.render().unwrap();
        assert_eq!(
            counter_value(
                &rendered,
                r#"http_requests_total{method="GET",route="root",status="200"}"#
            ),
            2
        );
        assert_eq!(
            counter_value(
                &rendered,
                r#"http_requests_total{method="GET",route="error",status="500"}"#
            ),
            1
        );
        assert_eq!(
            counter_value(
                &rendered,
                r#"http_requests_total{method="POST",route="root",status="200"}"#
            ),
            1
        );
    }

    #[test]
    fn histogram_uses_default_latency_buckets() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record_latency("GET", "slow", 0.75);

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains(r#"le="0.005""#));
        assert!(rendered.contains(r#"le="0.25""#));
        assert!(rendered.contains(r#"le="10""#));
        assert!(rendered.contains(r#"le="+Inf""#));
        assert_eq!(
            counter_value(
                &rendered,
                r#"http_request_duration_seconds_count{method="GET",route="slow"}"#
            ),
            1
        );
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: usize = 100;
        const INCREMENTS_PER_THREAD: usize = 10;

        let metrics = Arc::new(HttpMetrics::new().unwrap());
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let m = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..INCREMENTS_PER_THREAD {
                    m.record_request("GET", "root", StatusCode::OK);
                    m.record_latency("GET", "root", 0.001);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let rendered = metrics.render().unwrap();
        assert_eq!(
            counter_value(
                &rendered,
                r#"http_requests_total{method="GET",route="root",status="200"}"#
            ),
            (THREADS * INCREMENTS_PER_THREAD) as u64
        );
        assert_eq!(
            counter_value(
                &rendered,
                r#"http_request_duration_seconds_count{method="GET",route="root"}"#
            ),
            (THREADS * INCREMENTS_PER_THREAD) as u64
        );
    }
}
