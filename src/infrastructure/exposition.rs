//! Prometheus text exposition for collected samples
//!
//! Every scrape builds a fresh registry from the descriptors, so instances
//! that disappeared from the inventory vanish from the next exposition.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::domain::{MetricDescriptor, MetricKind, Sample};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encode one collection cycle in the Prometheus text format.
pub fn encode_samples(
    descriptors: &[MetricDescriptor],
    samples: &[Sample<'_>],
) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    let mut families = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let family = match descriptor.kind {
            MetricKind::Gauge => GaugeVec::new(
                Opts::new(descriptor.name.clone(), descriptor.help),
                descriptor.label_names,
            )?,
        };
        registry.register(Box::new(family.clone()))?;
        families.push((descriptor.name.as_str(), family));
    }

    for sample in samples {
        let Some((_, family)) = families.iter().find(|(name, _)| *name == sample.name()) else {
            continue;
        };
        let values: Vec<&str> = sample.label_values.iter().map(String::as_str).collect();
        family.get_metric_with_label_values(&values)?.set(sample.value);
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstanceMetric;

    fn descriptors() -> Vec<MetricDescriptor> {
        InstanceMetric::ALL
            .iter()
            .map(|m| MetricDescriptor::for_instance("aws_rds", *m))
            .collect()
    }

    fn sample_value(line: &str) -> f64 {
        line.rsplit(' ').next().unwrap().parse().unwrap()
    }

    #[test]
    fn test_encodes_gauges_with_labels() {
        let descriptors = descriptors();
        let samples = vec![
            Sample {
                descriptor: &descriptors[0],
                label_values: ["us-east-1".to_string(), "db-1".to_string()],
                value: 21_474_836_480.0,
            },
            Sample {
                descriptor: &descriptors[1],
                label_values: ["us-east-1".to_string(), "db-1".to_string()],
                value: 0.0,
            },
        ];

        let text = encode_samples(&descriptors, &samples).unwrap();

        assert!(text.contains("# TYPE aws_rds_storage gauge"));
        assert!(text.contains("# TYPE aws_rds_iops gauge"));
        assert!(text.contains("# HELP aws_rds_storage Amount of storage in bytes for the RDS instance"));

        let storage_line = text
            .lines()
            .find(|l| l.starts_with("aws_rds_storage{"))
            .unwrap();
        assert!(storage_line.contains("region=\"us-east-1\""));
        assert!(storage_line.contains("instance=\"db-1\""));
        assert_eq!(sample_value(storage_line), 21_474_836_480.0);

        let iops_line = text.lines().find(|l| l.starts_with("aws_rds_iops{")).unwrap();
        assert_eq!(sample_value(iops_line), 0.0);
    }

    #[test]
    fn test_no_samples_encodes_no_series() {
        let text = encode_samples(&descriptors(), &[]).unwrap();

        assert!(!text.contains("aws_rds_storage{"));
        assert!(!text.contains("aws_rds_iops{"));
    }
}
