//! Metric Bridge
//!
//! Turns one inventory listing into one set of labeled gauge samples.
//! Invoked synchronously by every scrape; holds no cross-scrape state that
//! influences what gets emitted.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::application::ports::SharedInstanceLister;
use crate::domain::{InstanceMetric, InstanceObservation, MetricDescriptor, Sample};

/// Bridges an [`InstanceLister`](crate::application::ports::InstanceLister)
/// to the pull-collector `describe` / `collect` shape.
pub struct MetricBridge {
    lister: SharedInstanceLister,
    region: String,
    descriptors: Vec<MetricDescriptor>,
    fetch_failures: AtomicU64,
    /// Unix millis of the last successful fetch, `0` if none yet.
    last_success_ms: AtomicI64,
}

impl MetricBridge {
    pub fn new(lister: SharedInstanceLister, region: impl Into<String>, namespace: &str) -> Self {
        let descriptors = InstanceMetric::ALL
            .iter()
            .map(|m| MetricDescriptor::for_instance(namespace, *m))
            .collect();

        Self {
            lister,
            region: region.into(),
            descriptors,
            fetch_failures: AtomicU64::new(0),
            last_success_ms: AtomicI64::new(0),
        }
    }

    /// The fixed descriptor set. Valid before any collection.
    pub fn describe(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Fetch failures since startup.
    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        match self.last_success_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    /// Runs one collection cycle.
    ///
    /// Calls the lister exactly once. A failed fetch yields no samples and is
    /// reported through the log and `aws_rds_exporter_fetch_failures_total`,
    /// never to the caller.
    pub async fn collect(&self) -> Vec<Sample<'_>> {
        let start = Instant::now();
        let result = self.lister.fetch().await;
        metrics::histogram!("aws_rds_exporter_collect_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        let observations = match result {
            Ok(observations) => observations,
            Err(e) => {
                self.fetch_failures.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("aws_rds_exporter_fetch_failures_total", "reason" => e.reason())
                    .increment(1);
                error!(region = %self.region, error = %e, "Failed to list RDS instances, skipping this scrape");
                return Vec::new();
            }
        };

        self.last_success_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);

        let observations = self.dedup_sorted(observations);
        metrics::gauge!("aws_rds_exporter_instances").set(observations.len() as f64);
        debug!(region = %self.region, instances = observations.len(), "Collected RDS instances");

        let mut samples = Vec::with_capacity(observations.len() * self.descriptors.len());
        for observation in &observations {
            for descriptor in &self.descriptors {
                if let Some(value) = descriptor.metric.value(observation) {
                    samples.push(Sample {
                        descriptor,
                        label_values: [self.region.clone(), observation.identifier.clone()],
                        value,
                    });
                }
            }
        }
        samples
    }

    /// Sorts by identifier and keeps the first record of each identifier.
    fn dedup_sorted(&self, mut observations: Vec<InstanceObservation>) -> Vec<InstanceObservation> {
        observations.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        let before = observations.len();
        observations.dedup_by(|later, first| later.identifier == first.identifier);
        let dropped = before - observations.len();

        if dropped > 0 {
            metrics::counter!("aws_rds_exporter_duplicate_instances_total").increment(dropped as u64);
            warn!(region = %self.region, dropped, "Provider returned duplicate instance identifiers");
        }
        observations
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::application::ports::InstanceLister;
    use crate::domain::{FetchError, StorageUnit};

    /// Replays queued responses, one per fetch.
    struct ScriptedLister {
        responses: Mutex<VecDeque<Result<Vec<InstanceObservation>, FetchError>>>,
        calls: AtomicU64,
    }

    impl ScriptedLister {
        fn new(responses: Vec<Result<Vec<InstanceObservation>, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl InstanceLister for ScriptedLister {
        async fn fetch(&self) -> Result<Vec<InstanceObservation>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn provider_error() -> FetchError {
        FetchError::Provider("DescribeDBInstances wrong!".into())
    }

    fn bridge(lister: Arc<ScriptedLister>) -> MetricBridge {
        MetricBridge::new(lister, "us-east-1", "aws_rds")
    }

    #[test]
    fn test_describe_before_collect() {
        let b = bridge(ScriptedLister::new(vec![]));
        let names: Vec<&str> = b.describe().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["aws_rds_storage", "aws_rds_iops"]);
    }

    #[tokio::test]
    async fn test_single_instance_without_iops() {
        let storage = StorageUnit::Gibibytes.to_bytes(20.0);
        let lister = ScriptedLister::new(vec![Ok(vec![InstanceObservation::new("db-1", storage, 0.0)])]);
        let b = bridge(lister.clone());

        let samples = b.collect().await;

        assert_eq!(lister.calls.load(Ordering::SeqCst), 1);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].name(), "aws_rds_storage");
        assert_eq!(samples[0].value, 21_474_836_480.0);
        assert_eq!(samples[1].name(), "aws_rds_iops");
        assert_eq!(samples[1].value, 0.0);
        for s in &samples {
            assert_eq!(s.label_values, ["us-east-1".to_string(), "db-1".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_two_instances_no_label_crosstalk() {
        let lister = ScriptedLister::new(vec![Ok(vec![
            InstanceObservation::new("db-b", 2.0, 3000.0),
            InstanceObservation::new("db-a", 1.0, 1000.0),
        ])]);
        let b = bridge(lister);

        let samples = b.collect().await;

        assert_eq!(samples.len(), 4);
        let rendered: Vec<(&str, &str, f64)> = samples
            .iter()
            .map(|s| (s.name(), s.label("instance").unwrap(), s.value))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("aws_rds_storage", "db-a", 1.0),
                ("aws_rds_iops", "db-a", 1000.0),
                ("aws_rds_storage", "db-b", 2.0),
                ("aws_rds_iops", "db-b", 3000.0),
            ]
        );
        assert!(samples.iter().all(|s| s.label("region") == Some("us-east-1")));
    }

    #[tokio::test]
    async fn test_failure_yields_nothing_then_recovers() {
        let lister = ScriptedLister::new(vec![
            Err(provider_error()),
            Ok(vec![InstanceObservation::new("db-1", 1.0, 0.0)]),
        ]);
        let b = bridge(lister);

        assert!(b.collect().await.is_empty());
        assert_eq!(b.fetch_failures(), 1);
        assert!(b.last_success().is_none());

        assert_eq!(b.collect().await.len(), 2);
        assert_eq!(b.fetch_failures(), 1);
        assert!(b.last_success().is_some());
    }

    #[tokio::test]
    async fn test_malformed_fetch_emits_nothing() {
        let lister = ScriptedLister::new(vec![Err(FetchError::MalformedRecord {
            index: 1,
            reason: "missing DBInstanceIdentifier".to_string(),
        })]);
        let b = bridge(lister);

        assert!(b.collect().await.is_empty());
        assert_eq!(b.fetch_failures(), 1);
    }

    #[tokio::test]
    async fn test_sample_count_is_twice_instances() {
        let observations: Vec<_> = (0..25)
            .map(|i| InstanceObservation::new(format!("db-{:02}", i), 1.0, 0.0))
            .collect();
        let b = bridge(ScriptedLister::new(vec![Ok(observations)]));

        assert_eq!(b.collect().await.len(), 50);
    }

    #[tokio::test]
    async fn test_duplicate_identifiers_keep_first() {
        let lister = ScriptedLister::new(vec![Ok(vec![
            InstanceObservation::new("db-1", 10.0, 100.0),
            InstanceObservation::new("db-1", 20.0, 200.0),
        ])]);
        let b = bridge(lister);

        let samples = b.collect().await;

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 10.0);
        assert_eq!(samples[1].value, 100.0);
    }
}
