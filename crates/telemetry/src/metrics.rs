//! Prometheus metrics for the validator rewards API.

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, HistogramVec, IntCounter, IntCounterVec,
    Registry, TextEncoder,
};

/// Metrics collector shared by the upstream clients and the services.
///
/// Every instance owns its registry, so independent instances (one per
/// test, say) never collide on metric names.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    blocks_classified: IntCounterVec,
    reward_failures: IntCounter,
    upstream_errors: IntCounter,
    upstream_latency: HistogramVec,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let blocks_classified = register_int_counter_vec_with_registry!(
            "validator_api_blocks_classified_total",
            "Total number of blocks classified, by classification",
            &["classification"],
            registry
        )?;

        let reward_failures = register_int_counter_with_registry!(
            "validator_api_reward_failures_total",
            "Total number of block reward computations that failed",
            registry
        )?;

        let upstream_errors = register_int_counter_with_registry!(
            "validator_api_upstream_errors_total",
            "Total number of failed beacon node or execution RPC calls",
            registry
        )?;

        let upstream_latency = register_histogram_vec_with_registry!(
            "validator_api_upstream_latency_seconds",
            "Upstream call latency in seconds",
            &["operation"],
            registry
        )?;

        Ok(Self {
            registry,
            blocks_classified,
            reward_failures,
            upstream_errors,
            upstream_latency,
        })
    }

    /// Count a classified block under its label ("MEV Relay" / "Vanilla Block").
    pub fn inc_blocks_classified(&self, classification: &str) {
        self.blocks_classified.with_label_values(&[classification]).inc();
    }

    pub fn inc_reward_failures(&self) {
        self.reward_failures.inc();
    }

    pub fn inc_upstream_errors(&self) {
        self.upstream_errors.inc();
    }

    /// Record upstream call latency.
    pub fn observe_upstream_latency(&self, operation: &str, duration_secs: f64) {
        self.upstream_latency.with_label_values(&[operation]).observe(duration_secs);
    }

    /// Get Prometheus metrics in the text exposition format.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
