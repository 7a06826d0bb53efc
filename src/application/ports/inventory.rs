//! Inventory port — the capability the metric bridge collects through
//!
//! [`InstanceLister`] decouples the bridge from the concrete provider client.
//! The production implementation is
//! [`RdsInstanceLister`](crate::infrastructure::rds::RdsInstanceLister);
//! tests substitute a scripted lister returning fixed data or a fixed error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{FetchError, InstanceObservation};

/// Lists every database instance visible in the configured region.
///
/// One call performs one complete listing: every page is consumed before
/// returning, and any failure discards the whole result.
#[async_trait]
pub trait InstanceLister: Send + Sync {
    async fn fetch(&self) -> Result<Vec<InstanceObservation>, FetchError>;
}

pub type SharedInstanceLister = Arc<dyn InstanceLister>;
