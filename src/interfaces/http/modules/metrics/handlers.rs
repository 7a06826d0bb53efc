//! Prometheus scrape handler
//!
//! Every `GET <telemetry_path>` runs one collection cycle through the
//! [`MetricBridge`] and renders the instance gauges followed by the
//! exporter's own metrics from the global `metrics-exporter-prometheus`
//! recorder.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::error;

use crate::application::MetricBridge;
use crate::infrastructure::{encode_samples, TEXT_CONTENT_TYPE};

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub bridge: Arc<MetricBridge>,
    pub handle: PrometheusHandle,
}

/// `GET /metrics` — Prometheus scrape endpoint (no auth)
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> Response {
    let samples = state.bridge.collect().await;

    let mut body = match encode_samples(state.bridge.describe(), &samples) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Failed to encode RDS metrics");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response();
        }
    };
    body.push_str(&state.handle.render());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
        body,
    )
        .into_response()
}
