//! Demo route handlers.
//!
//! Three handlers whose only interesting signal is their status outcome:
//! an immediate success, a forced server error, and a randomized delay.
//! Everything worth observing about them is captured by the
//! instrumentation wrapper.

use std::time::Duration;

use axum::http::StatusCode;
use rand::Rng;

/// `GET /` immediate success.
pub async fn root() -> (StatusCode, &'static str) {
    tracing::info!(route = "/", "handled");
    (StatusCode::OK, "ok\n")
}

/// `GET /error` deterministic 500, for exercising error paths downstream.
pub async fn error() -> (StatusCode, &'static str) {
    tracing::error!(route = "/error", "forced error");
    (StatusCode::INTERNAL_SERVER_ERROR, "forced error\n")
}

/// `GET /slow` success after a uniformly random 100-1500 ms delay.
pub async fn slow() -> (StatusCode, String) {
    // ThreadRng is not Send; scope it out before the await.
    let delay_ms: u64 = {
        let mut rng = rand::thread_rng();
        rng.gen_range(100..1500)
    };
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    tracing::info!(route = "/slow", delay_ms, "handled");
    (StatusCode::OK, format!("slow ok after {delay_ms} ms\n"))
}
