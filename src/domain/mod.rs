//! Domain layer: instance observations, metric descriptors and error types

pub mod errors;
pub mod instance;
pub mod metric;

pub use errors::{ConstructionError, FetchError, ProviderError};
pub use instance::{InstanceObservation, StorageUnit};
pub use metric::{InstanceMetric, MetricDescriptor, MetricKind, Sample, INSTANCE_LABELS};
