use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::domain::ComplianceStatus;

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Shipments evaluated, single and bulk
    pub shipments_total: AtomicU64,

    /// Shipments by outcome
    pub shipments_compliant: AtomicU64,
    pub shipments_review: AtomicU64,
    pub shipments_flagged: AtomicU64,
    pub shipments_rejected: AtomicU64,

    /// Shipments that degraded to REVIEW because evaluation failed
    pub shipments_degraded: AtomicU64,

    /// Bulk requests and their sizes
    pub bulk_requests_total: AtomicU64,

    /// Request evaluation latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_50_100ms: AtomicU64,
    pub latency_over_100ms: AtomicU64,

    /// Rule store reads that failed
    pub store_errors_total: AtomicU64,

    /// Language model calls
    pub model_attempts_total: AtomicU64,
    pub model_failures_total: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record one evaluated shipment.
    pub fn record_status(&self, status: ComplianceStatus) {
        self.shipments_total.fetch_add(1, Ordering::Relaxed);

        let counter = match status {
            ComplianceStatus::Compliant => &self.shipments_compliant,
            ComplianceStatus::Review => &self.shipments_review,
            ComplianceStatus::Flagged => &self.shipments_flagged,
            ComplianceStatus::Rejected => &self.shipments_rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_degraded(&self) {
        self.shipments_degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bulk_request(&self) {
        self.bulk_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record evaluation latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        let bucket = if micros < 1_000 {
            &self.latency_under_1ms
        } else if micros < 5_000 {
            &self.latency_1_5ms
        } else if micros < 10_000 {
            &self.latency_5_10ms
        } else if micros < 50_000 {
            &self.latency_10_50ms
        } else if micros < 100_000 {
            &self.latency_50_100ms
        } else {
            &self.latency_over_100ms
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one model call attempt.
    pub fn record_model_attempt(&self, success: bool) {
        self.model_attempts_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.model_failures_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP shipcheck_shipments_total Total number of shipments evaluated
# TYPE shipcheck_shipments_total counter
shipcheck_shipments_total {}

# HELP shipcheck_shipments Shipments by compliance status
# TYPE shipcheck_shipments counter
shipcheck_shipments{{status="compliant"}} {}
shipcheck_shipments{{status="review"}} {}
shipcheck_shipments{{status="flagged"}} {}
shipcheck_shipments{{status="rejected"}} {}

# HELP shipcheck_shipments_degraded_total Shipments degraded to review after an evaluation failure
# TYPE shipcheck_shipments_degraded_total counter
shipcheck_shipments_degraded_total {}

# HELP shipcheck_bulk_requests_total Bulk check requests
# TYPE shipcheck_bulk_requests_total counter
shipcheck_bulk_requests_total {}

# HELP shipcheck_evaluation_latency_bucket Evaluation latency histogram
# TYPE shipcheck_evaluation_latency_bucket counter
shipcheck_evaluation_latency_bucket{{le="0.001"}} {}
shipcheck_evaluation_latency_bucket{{le="0.005"}} {}
shipcheck_evaluation_latency_bucket{{le="0.01"}} {}
shipcheck_evaluation_latency_bucket{{le="0.05"}} {}
shipcheck_evaluation_latency_bucket{{le="0.1"}} {}
shipcheck_evaluation_latency_bucket{{le="+Inf"}} {}

# HELP shipcheck_store_errors_total Rule store read failures
# TYPE shipcheck_store_errors_total counter
shipcheck_store_errors_total {}

# HELP shipcheck_model_attempts_total Language model call attempts
# TYPE shipcheck_model_attempts_total counter
shipcheck_model_attempts_total {}

# HELP shipcheck_model_failures_total Failed language model call attempts
# TYPE shipcheck_model_failures_total counter
shipcheck_model_failures_total {}
"#,
            self.shipments_total.load(Ordering::Relaxed),
            self.shipments_compliant.load(Ordering::Relaxed),
            self.shipments_review.load(Ordering::Relaxed),
            self.shipments_flagged.load(Ordering::Relaxed),
            self.shipments_rejected.load(Ordering::Relaxed),
            self.shipments_degraded.load(Ordering::Relaxed),
            self.bulk_requests_total.load(Ordering::Relaxed),
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_50_100ms.load(Ordering::Relaxed),
            self.latency_over_100ms.load(Ordering::Relaxed),
            self.store_errors_total.load(Ordering::Relaxed),
            self.model_attempts_total.load(Ordering::Relaxed),
            self.model_failures_total.load(Ordering::Relaxed),
        )
    }
}

/// Records evaluation latency when dropped.
pub struct TimingGuard<'a> {
    registry: &'a MetricsRegistry,
    start: Instant,
}

impl<'a> TimingGuard<'a> {
    pub fn new(registry: &'a MetricsRegistry) -> Self {
        TimingGuard {
            registry,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for TimingGuard<'a> {
    fn drop(&mut self) {
        self.registry.record_latency(self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_status() {
        let metrics = MetricsRegistry::new();

        metrics.record_status(ComplianceStatus::Compliant);
        metrics.record_status(ComplianceStatus::Compliant);
        metrics.record_status(ComplianceStatus::Rejected);

        assert_eq!(metrics.shipments_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.shipments_compliant.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.shipments_rejected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.shipments_flagged.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_timing_guard_records_latency() {
        let metrics = MetricsRegistry::new();
        {
            let _timer = TimingGuard::new(&metrics);
        }

        let recorded = metrics.latency_under_1ms.load(Ordering::Relaxed)
            + metrics.latency_1_5ms.load(Ordering::Relaxed)
            + metrics.latency_5_10ms.load(Ordering::Relaxed)
            + metrics.latency_10_50ms.load(Ordering::Relaxed)
            + metrics.latency_50_100ms.load(Ordering::Relaxed)
            + metrics.latency_over_100ms.load(Ordering::Relaxed);
        assert_eq!(recorded, 1);
    }

    #[test]
    fn test_model_attempts() {
        let metrics = MetricsRegistry::new();
        metrics.record_model_attempt(false);
        metrics.record_model_attempt(true);

        assert_eq!(metrics.model_attempts_total.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.model_failures_total.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = MetricsRegistry::new();
        metrics.record_status(ComplianceStatus::Flagged);

        let output = metrics.to_prometheus();

        assert!(output.contains("shipcheck_shipments_total 1"));
        assert!(output.contains("shipcheck_shipments{status=\"flagged\"} 1"));
        assert!(output.contains("shipcheck_model_attempts_total 0"));
    }
}
