//! HTTP request metrics middleware
//!
//! Counts requests served by the exporter itself, the equivalent of the
//! `promhttp_metric_handler_requests_total` series Go exporters carry.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Records, per matched route:
///
/// - **`http_requests_total`** — counter with labels `path`, `status`
/// - **`http_request_duration_seconds`** — histogram with label `path`
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    metrics::counter!("http_requests_total", "path" => path.clone(), "status" => status).increment(1);
    metrics::histogram!("http_request_duration_seconds", "path" => path).record(elapsed);

    response
}
