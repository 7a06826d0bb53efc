//! Configuration module
//!
//! `AppConfig` is read from a TOML file
//! (`~/.config/aws-rds-exporter/config.toml` by default). Every section and
//! field has a default, so an empty or missing file yields a working setup.
//!
//! ```toml
//! [server]
//! listen_address = "0.0.0.0:9785"
//! telemetry_path = "/metrics"
//!
//! [aws]
//! region = "eu-west-1"
//!
//! [collector]
//! storage_unit = "gibibytes"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::StorageUnit;

/// Paths served by the exporter itself; the telemetry path may not shadow them.
const RESERVED_PATHS: [&str; 4] = ["/", "/health", "/-/healthy", "/-/ready"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Default config location: `~/.config/aws-rds-exporter/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aws-rds-exporter")
        .join("config.toml")
}

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub collector: CollectorConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on for the web interface and telemetry
    pub listen_address: String,
    /// Path under which metrics are exposed
    pub telemetry_path: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:9785".to_string(),
            telemetry_path: "/metrics".to_string(),
            shutdown_timeout: 30,
        }
    }
}

/// AWS client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Region to query
    pub region: String,
    /// Named profile from the shared AWS config files
    pub profile: Option<String>,
    /// Endpoint override, e.g. a local RDS emulator
    pub endpoint_url: Option<String>,
    /// `MaxRecords` per `DescribeDBInstances` page (20..=100)
    pub page_size: i32,
    /// Upper bound for one complete listing, in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
            endpoint_url: None,
            page_size: 100,
            fetch_timeout_secs: 30,
        }
    }
}

/// Metric naming and unit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Metric name prefix
    pub namespace: String,
    /// Unit RDS reports `AllocatedStorage` in
    pub storage_unit: StorageUnit,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            namespace: "aws_rds".to_string(),
            storage_unit: StorageUnit::default(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults are returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings the exporter cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aws.region.trim().is_empty() {
            return Err(invalid("aws.region", "must not be empty"));
        }
        if !is_valid_region(&self.aws.region) {
            return Err(invalid(
                "aws.region",
                format!("{:?} is not a region code", self.aws.region),
            ));
        }
        if !(20..=100).contains(&self.aws.page_size) {
            return Err(invalid(
                "aws.page_size",
                format!("{} is outside 20..=100", self.aws.page_size),
            ));
        }
        if self.aws.fetch_timeout_secs == 0 {
            return Err(invalid("aws.fetch_timeout_secs", "must be greater than zero"));
        }
        if !self.server.telemetry_path.starts_with('/') {
            return Err(invalid("server.telemetry_path", "must start with '/'"));
        }
        if RESERVED_PATHS.contains(&self.server.telemetry_path.as_str()) {
            return Err(invalid(
                "server.telemetry_path",
                format!("{} is reserved", self.server.telemetry_path),
            ));
        }
        if self.collector.namespace.trim().is_empty() {
            return Err(invalid("collector.namespace", "must not be empty"));
        }
        if !is_valid_metric_prefix(&self.collector.namespace) {
            return Err(invalid(
                "collector.namespace",
                format!(
                    "{:?} must match [a-zA-Z_:][a-zA-Z0-9_:]*",
                    self.collector.namespace
                ),
            ));
        }
        Ok(())
    }
}

/// Region codes look like `us-east-1` or `us-gov-west-1`.
pub fn is_valid_region(region: &str) -> bool {
    matches!(region.chars().next(), Some(c) if c.is_ascii_lowercase())
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !region.ends_with('-')
}

/// Prometheus metric names: `[a-zA-Z_:][a-zA-Z0-9_:]*`.
fn is_valid_metric_prefix(name: &str) -> bool {
    matches!(name.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.listen_address, "0.0.0.0:9785");
        assert_eq!(cfg.server.telemetry_path, "/metrics");
        assert_eq!(cfg.aws.region, "us-east-1");
        assert_eq!(cfg.collector.storage_unit, StorageUnit::Gibibytes);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [aws]
            region = "eu-central-1"

            [collector]
            storage_unit = "gigabytes"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.aws.region, "eu-central-1");
        assert_eq!(cfg.aws.page_size, 100);
        assert_eq!(cfg.collector.namespace, "aws_rds");
        assert_eq!(cfg.collector.storage_unit, StorageUnit::Gigabytes);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_missing_file_returns_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/aws-rds-exporter.toml")).unwrap();
        assert_eq!(cfg.aws.region, "us-east-1");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.aws.region = "  ".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "aws.region", .. })
        ));

        let mut cfg = AppConfig::default();
        cfg.aws.page_size = 500;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.telemetry_path = "metrics".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.telemetry_path = "/-/healthy".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_region() {
        for region in ["US EAST 1", "US-EAST-1", "-us-east-1", "us-east-"] {
            let mut cfg = AppConfig::default();
            cfg.aws.region = region.to_string();
            assert!(
                matches!(
                    cfg.validate(),
                    Err(ConfigError::Invalid { field: "aws.region", .. })
                ),
                "{region} should be rejected"
            );
        }

        let mut cfg = AppConfig::default();
        cfg.aws.region = "us-gov-west-1".to_string();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_namespace() {
        for namespace in ["aws-rds", " aws_rds ", "1rds", "rds.prod"] {
            let mut cfg = AppConfig::default();
            cfg.collector.namespace = namespace.to_string();
            assert!(
                matches!(
                    cfg.validate(),
                    Err(ConfigError::Invalid { field: "collector.namespace", .. })
                ),
                "{namespace:?} should be rejected"
            );
        }

        for namespace in ["rds", "_rds", "team:rds_prod"] {
            let mut cfg = AppConfig::default();
            cfg.collector.namespace = namespace.to_string();
            assert!(cfg.validate().is_ok(), "{namespace:?} should be accepted");
        }
    }

    #[test]
    fn test_valid_namespace_encodes() {
        use crate::domain::{InstanceMetric, MetricDescriptor};
        use crate::infrastructure::encode_samples;

        let mut cfg = AppConfig::default();
        cfg.collector.namespace = "team:rds_prod".to_string();
        assert!(cfg.validate().is_ok());

        let descriptors: Vec<_> = InstanceMetric::ALL
            .iter()
            .map(|m| MetricDescriptor::for_instance(&cfg.collector.namespace, *m))
            .collect();
        assert!(encode_samples(&descriptors, &[]).is_ok());
    }
}
