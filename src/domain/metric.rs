//! Metric descriptors and the samples emitted against them

use std::fmt;

use super::instance::InstanceObservation;

/// Label names attached to every instance metric, in emission order.
pub const INSTANCE_LABELS: [&str; 2] = ["region", "instance"];

/// Exposition kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
        }
    }
}

/// The per-instance facts the exporter publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceMetric {
    Storage,
    Iops,
}

impl InstanceMetric {
    pub const ALL: [InstanceMetric; 2] = [InstanceMetric::Storage, InstanceMetric::Iops];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Iops => "iops",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::Storage => "Amount of storage in bytes for the RDS instance",
            Self::Iops => "Amount of provisioned IOPS (I/O operations per second) for the RDS instance",
        }
    }

    /// Value of this metric on an observation, `None` if undefined.
    pub fn value(self, observation: &InstanceObservation) -> Option<f64> {
        match self {
            Self::Storage => Some(observation.allocated_storage_bytes),
            Self::Iops => Some(observation.provisioned_iops),
        }
    }
}

/// Static name/help/label-shape declaration for one exposed metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub metric: InstanceMetric,
    pub name: String,
    pub help: &'static str,
    pub kind: MetricKind,
    pub label_names: &'static [&'static str],
}

impl MetricDescriptor {
    /// Descriptor named `<namespace>_<suffix>` carrying the instance labels.
    pub fn for_instance(namespace: &str, metric: InstanceMetric) -> Self {
        Self {
            metric,
            name: build_fq_name(namespace, metric.suffix()),
            help: metric.help(),
            kind: MetricKind::Gauge,
            label_names: &INSTANCE_LABELS,
        }
    }
}

fn build_fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", namespace, name)
    }
}

/// One observation of one descriptor, ready for the serializer.
///
/// `label_values` are ordered like `descriptor.label_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    pub descriptor: &'a MetricDescriptor,
    pub label_values: [String; 2],
    pub value: f64,
}

impl Sample<'_> {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|l| *l == name)
            .map(|i| self.label_values[i].as_str())
    }
}
