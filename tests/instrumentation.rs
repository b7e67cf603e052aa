//! End-to-end instrumentation tests against a real listener.

use std::sync::Arc;
use std::time::{Duration, Instant};

use demo_app::config::AppConfig;
use demo_app::http::HttpServer;
use demo_app::lifecycle::Shutdown;
use demo_app::observability::metrics::HttpMetrics;
use tokio::task::JoinHandle;

struct TestServer {
    base_url: String,
    metrics: Arc<HttpMetrics>,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

async fn start_server() -> TestServer {
    let config = AppConfig::default();
    let metrics = Arc::new(HttpMetrics::new().unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, Arc::clone(&metrics), None);
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer {
        base_url: format!("http://{addr}"),
        metrics,
        shutdown,
        handle,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Value of the first sample line containing `needle`.
fn sample_value(rendered: &str, needle: &str) -> f64 {
    rendered
        .lines()
        .find(|line| !line.starts_with('#') && line.contains(needle))
        .and_then(|line| line.split_whitespace().last())
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("no sample matching {needle} in:\n{rendered}"))
}

#[tokio::test]
async fn root_request_is_counted_as_200() {
    let server = start_server().await;

    let res = client()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "ok\n");

    let rendered = server.metrics.render().unwrap();
    assert_eq!(
        sample_value(
            &rendered,
            r#"http_requests_total{method="GET",route="root",status="200"}"#
        ),
        1.0
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn error_request_is_counted_as_500() {
    let server = start_server().await;

    let res = client()
        .get(format!("{}/error", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);

    let rendered = server.metrics.render().unwrap();
    assert_eq!(
        sample_value(
            &rendered,
            r#"http_requests_total{method="GET",route="error",status="500"}"#
        ),
        1.0
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn slow_request_latency_lands_in_expected_range() {
    let server = start_server().await;

    let started = Instant::now();
    let res = client()
        .get(format!("{}/slow", server.base_url))
        .send()
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(res.status().as_u16(), 200);
    assert!(elapsed >= Duration::from_millis(100), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "too slow: {elapsed:?}");

    let rendered = server.metrics.render().unwrap();
    let sum = sample_value(
        &rendered,
        r#"http_request_duration_seconds_sum{method="GET",route="slow"}"#,
    );
    assert!(sum >= 0.09 && sum < 3.0, "recorded latency out of range: {sum}");

    server.shutdown.trigger();
}

#[tokio::test]
async fn concurrent_requests_lose_no_counts() {
    const REQUESTS: usize = 100;

    let server = start_server().await;
    let client = client();

    let mut tasks = Vec::new();
    for _ in 0..REQUESTS {
        let client = client.clone();
        let url = format!("{}/", server.base_url);
        tasks.push(tokio::spawn(async move {
            client.get(url).send().await.unwrap().status().as_u16()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 200);
    }

    let rendered = server.metrics.render().unwrap();
    assert_eq!(
        sample_value(
            &rendered,
            r#"http_requests_total{method="GET",route="root",status="200"}"#
        ),
        REQUESTS as f64
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn metrics_endpoint_serves_text_exposition() {
    let server = start_server().await;
    let client = client();

    // Generate one sample of each family first.
    client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/metrics", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "{content_type}");

    let body = res.text().await.unwrap();
    assert!(body.contains("# TYPE http_requests_total counter"));
    assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
    assert!(body.contains(r#"le="0.005""#));
    assert!(body.contains(r#"le="10""#));
    assert!(body.contains(r#"le="+Inf""#));

    server.shutdown.trigger();
}

#[tokio::test]
async fn shutdown_trigger_stops_the_server() {
    let server = start_server().await;

    // Server is up before the trigger.
    let res = client()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop after shutdown trigger")
        .unwrap();
}
