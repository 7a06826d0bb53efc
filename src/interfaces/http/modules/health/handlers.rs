//! Health check handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::MetricBridge;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub bridge: Arc<MetricBridge>,
    pub started_at: Arc<Instant>,
}

/// Exporter health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub region: String,
    pub fetch_failures_total: u64,
    pub last_successful_collect: Option<DateTime<Utc>>,
}

/// `GET /health` — exporter status as JSON.
///
/// Always `200`: a failing provider suppresses samples but never makes the
/// exporter itself unhealthy.
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        region: state.bridge.region().to_string(),
        fetch_failures_total: state.bridge.fetch_failures(),
        last_successful_collect: state.bridge.last_success(),
    })
}

/// `GET /-/healthy`
pub async fn healthy() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// `GET /-/ready`
pub async fn ready() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
