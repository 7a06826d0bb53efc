//! AWS RDS inventory client

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_rds::config::Region;
use aws_sdk_rds::types::DbInstance;
use aws_sdk_rds::Client;
use tracing::{debug, info};

use super::mapping::map_instances;
use crate::application::ports::InstanceLister;
use crate::config::{is_valid_region, AwsConfig};
use crate::domain::{ConstructionError, FetchError, InstanceObservation, StorageUnit};

/// [`InstanceLister`] backed by `DescribeDBInstances`.
pub struct RdsInstanceLister {
    client: Client,
    page_size: i32,
    timeout: Duration,
    storage_unit: StorageUnit,
}

impl RdsInstanceLister {
    /// Build the SDK client for `config.region`.
    ///
    /// Credentials are resolved lazily by the default provider chain, so a
    /// missing credential surfaces as a [`FetchError`] on the first scrape.
    pub async fn connect(config: &AwsConfig, storage_unit: StorageUnit) -> Result<Self, ConstructionError> {
        if !is_valid_region(&config.region) {
            return Err(ConstructionError::InvalidRegion(config.region.clone()));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = &config.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;

        info!(
            region = %config.region,
            page_size = config.page_size,
            timeout_secs = config.fetch_timeout_secs,
            "RDS client ready"
        );

        Ok(Self::with_client(
            Client::new(&sdk_config),
            config.page_size,
            Duration::from_secs(config.fetch_timeout_secs),
            storage_unit,
        ))
    }

    fn with_client(client: Client, page_size: i32, timeout: Duration, storage_unit: StorageUnit) -> Self {
        Self {
            client,
            page_size,
            timeout,
            storage_unit,
        }
    }

    async fn describe_all(&self) -> Result<Vec<DbInstance>, FetchError> {
        let mut stream = self
            .client
            .describe_db_instances()
            .max_records(self.page_size)
            .into_paginator()
            .items()
            .send();

        let mut records = Vec::new();
        while let Some(item) = stream.next().await {
            let record = item.map_err(|e| FetchError::Provider(Box::new(aws_sdk_rds::Error::from(e))))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl InstanceLister for RdsInstanceLister {
    async fn fetch(&self) -> Result<Vec<InstanceObservation>, FetchError> {
        let records = tokio::time::timeout(self.timeout, self.describe_all())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        debug!(records = records.len(), "DescribeDBInstances complete");
        map_instances(&records, self.storage_unit)
    }
}
