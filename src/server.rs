//! Exporter runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full lifecycle: metrics
//! recorder, RDS client, metric bridge, HTTP listener and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::application::{MetricBridge, SharedInstanceLister};
use crate::config::AppConfig;
use crate::domain::ConstructionError;
use crate::infrastructure::RdsInstanceLister;
use crate::interfaces::http::create_router;
use crate::shared::shutdown::ShutdownCoordinator;

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the exporter.
#[derive(Default)]
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Inventory source. `None` builds the AWS RDS client from `config.aws`.
    pub lister: Option<SharedInstanceLister>,
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running exporter.
///
/// ```rust,no_run
/// use aws_rds_exporter::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the HTTP listener is bound to.
    pub local_addr: SocketAddr,
    /// Bridge serving every scrape.
    pub bridge: Arc<MetricBridge>,

    shutdown: ShutdownCoordinator,
    http_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Start the exporter.
    ///
    /// Fails, and nothing is served, if the configuration is invalid, the
    /// RDS client cannot be built, or the listener cannot bind.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        config
            .validate()
            .map_err(|e| ConstructionError::InvalidConfig(e.to_string()))?;

        info!("Starting AWS RDS exporter {}...", env!("CARGO_PKG_VERSION"));

        let prometheus_handle = prometheus_handle()?;

        // ── Inventory source ───────────────────────────────────
        let lister: SharedInstanceLister = match opts.lister {
            Some(lister) => lister,
            None => Arc::new(
                RdsInstanceLister::connect(&config.aws, config.collector.storage_unit).await?,
            ),
        };
        let bridge = Arc::new(MetricBridge::new(
            lister,
            config.aws.region.clone(),
            &config.collector.namespace,
        ));
        info!(
            region = %config.aws.region,
            storage_unit = %config.collector.storage_unit,
            metrics = ?bridge.describe().iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "Metric bridge ready"
        );

        // ── HTTP server ────────────────────────────────────────
        let router = create_router(
            bridge.clone(),
            prometheus_handle,
            &config.server.telemetry_path,
        );

        let listener = tokio::net::TcpListener::bind(&config.server.listen_address)
            .await
            .map_err(|source| ConstructionError::Bind {
                address: config.server.listen_address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(
            "Serving metrics on http://{}{}",
            local_addr, config.server.telemetry_path
        );

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let http_shutdown = shutdown.signal();
        let http_task = tokio::spawn(async move {
            let result = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async move {
                    http_shutdown.wait().await;
                    info!("🛑 HTTP server received shutdown signal");
                })
                .await;
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            bridge,
            shutdown,
            http_task,
        })
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Run until shutdown is triggered or the server stops on its own, then
    /// drain in-flight scrapes within the configured timeout.
    pub async fn wait(self) {
        let Self {
            shutdown,
            mut http_task,
            ..
        } = self;

        let signal = shutdown.signal();
        tokio::select! {
            _ = signal.wait() => {}
            result = &mut http_task => {
                if let Err(e) = result {
                    error!("HTTP server task panicked: {}", e);
                }
                info!("HTTP server stopped");
                return;
            }
        }

        shutdown
            .drain(async move {
                if let Err(e) = http_task.await {
                    error!("HTTP server task panicked: {}", e);
                }
            })
            .await;

        info!("👋 AWS RDS exporter shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down AWS RDS exporter...");
        self.trigger_shutdown();
        self.wait().await;
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Install the global metrics recorder, or reuse it on restart within the
/// same process.
fn prometheus_handle() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_self_metrics();
    info!("📊 Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

fn describe_self_metrics() {
    metrics::describe_gauge!(
        "aws_rds_exporter_build_info",
        "A metric with a constant '1' value labeled by the exporter version"
    );
    metrics::describe_counter!(
        "aws_rds_exporter_fetch_failures_total",
        "Scrapes that produced no RDS samples because the inventory listing failed"
    );
    metrics::describe_histogram!(
        "aws_rds_exporter_collect_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent listing RDS instances per scrape"
    );
    metrics::describe_gauge!(
        "aws_rds_exporter_instances",
        "RDS instances seen by the last successful listing"
    );
    metrics::describe_counter!(
        "aws_rds_exporter_duplicate_instances_total",
        "Instance records dropped because their identifier was already listed"
    );

    metrics::gauge!("aws_rds_exporter_build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
