//! AWS RDS exporter — CLI server
//!
//! ```sh
//! # Run with default config (~/.config/aws-rds-exporter/config.toml)
//! aws-rds-exporter
//!
//! # Custom config path
//! aws-rds-exporter --config /etc/aws-rds-exporter/config.toml
//!
//! # Override region and listen address
//! aws-rds-exporter --rds.region eu-west-1 --web.listen-address :9785
//!
//! # Validate config without starting
//! aws-rds-exporter --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use aws_rds_exporter::config::AppConfig;
use aws_rds_exporter::server::{init_tracing, ServerHandle, ServerOptions};

/// Prometheus exporter for AWS RDS instance storage and IOPS.
#[derive(Parser, Debug)]
#[command(name = "aws-rds-exporter", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RDS_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path")]
    telemetry_path: Option<String>,

    /// AWS region to query.
    #[arg(long = "rds.region")]
    region: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the log format (text, json).
    #[arg(long)]
    log_format: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(addr) = &self.listen_address {
            config.server.listen_address = normalize_listen_address(addr);
        }
        if let Some(path) = &self.telemetry_path {
            config.server.telemetry_path = path.clone();
        }
        if let Some(region) = &self.region {
            config.aws.region = region.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
    }
}

/// Accept the `:9785` shorthand for all interfaces.
fn normalize_listen_address(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(aws_rds_exporter::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply_overrides(&mut config);

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            eprintln!("❌ Configuration is invalid: {}", e);
            return ExitCode::FAILURE;
        }
        println!("✅ Configuration is valid");
        println!("   Config file    : {}", config_path.display());
        println!("   Listen address : {}", config.server.listen_address);
        println!("   Telemetry path : {}", config.server.telemetry_path);
        println!("   Region         : {}", config.aws.region);
        println!("   Storage unit   : {}", config.collector.storage_unit);
        println!("   Log level      : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions {
        config,
        lister: None,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start exporter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::parse_from([
            "aws-rds-exporter",
            "--web.listen-address",
            ":9999",
            "--rds.region",
            "ap-south-1",
            "--web.telemetry-path",
            "/rds",
        ]);
        let mut config = AppConfig::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.server.listen_address, "0.0.0.0:9999");
        assert_eq!(config.server.telemetry_path, "/rds");
        assert_eq!(config.aws.region, "ap-south-1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_check_rejects_malformed_region_override() {
        let cli = Cli::parse_from(["aws-rds-exporter", "--rds.region", "US EAST 1", "--check"]);
        let mut config = AppConfig::default();

        cli.apply_overrides(&mut config);

        assert!(cli.check);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_listen_address_passthrough() {
        assert_eq!(normalize_listen_address("127.0.0.1:9785"), "127.0.0.1:9785");
    }
}
