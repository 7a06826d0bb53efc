//! # AWS RDS Exporter
//!
//! Prometheus exporter publishing the allocated storage and provisioned IOPS
//! of every RDS instance in a region.
//!
//! ## Architecture
//!
//! - **domain**: instance observations, metric descriptors, error types
//! - **application**: the `InstanceLister` port and the `MetricBridge`
//!   turning one listing into one set of gauge samples
//! - **infrastructure**: the AWS RDS client and the text exposition encoder
//! - **interfaces**: HTTP router (scrape, health, landing page)
//! - **server**: process lifecycle and logging setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use server::{init_tracing, ServerHandle, ServerOptions};
