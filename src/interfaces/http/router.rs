//! HTTP router

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use super::modules::health::{self, HealthState};
use super::modules::landing::{self, LandingState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use crate::application::MetricBridge;

/// Create the exporter router.
///
/// | Route              | Handler                       |
/// |--------------------|-------------------------------|
/// | `/`                | landing page                  |
/// | `<telemetry_path>` | scrape: RDS gauges + self-metrics |
/// | `/health`          | JSON status                   |
/// | `/-/healthy`       | liveness                      |
/// | `/-/ready`         | readiness                     |
pub fn create_router(
    bridge: Arc<MetricBridge>,
    prometheus_handle: PrometheusHandle,
    telemetry_path: &str,
) -> Router {
    let metrics_routes = Router::new()
        .route(telemetry_path, get(prometheus_metrics))
        .with_state(MetricsState {
            bridge: bridge.clone(),
            handle: prometheus_handle,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            bridge,
            started_at: Arc::new(Instant::now()),
        })
        .route("/-/healthy", get(health::healthy))
        .route("/-/ready", get(health::ready));

    let landing_routes = Router::new()
        .route("/", get(landing::index))
        .with_state(LandingState {
            telemetry_path: telemetry_path.to_string(),
        });

    Router::new()
        .merge(landing_routes)
        .merge(metrics_routes)
        .merge(health_routes)
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
