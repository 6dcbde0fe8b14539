//! Prometheus counters for routed traffic.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Request and response counters, labelled by shard.
pub struct ProxyMetrics {
    registry: Registry,
    /// Requests forwarded, by shard.
    requests: IntCounterVec,
    /// Upstream responses, by shard and status code.
    responses: IntCounterVec,
}

impl ProxyMetrics {
    /// Create the counters in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "shard_router_requests_total",
                "Total number of HTTP requests",
            ),
            &["shard"],
        )?;
        let responses = IntCounterVec::new(
            Opts::new(
                "shard_router_responses_total",
                "Total number of HTTP responses",
            ),
            &["shard", "status"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(responses.clone()))?;

        Ok(Self {
            registry,
            requests,
            responses,
        })
    }

    /// Count a request forwarded to `shard`.
    pub fn record_request(&self, shard: &str) {
        self.requests.with_label_values(&[shard]).inc();
    }

    /// Count a response from `shard`.
    pub fn record_response(&self, shard: &str, status: u16) {
        let status = status.to_string();
        self.responses
            .with_label_values(&[shard, status.as_str()])
            .inc();
    }

    /// Requests forwarded to `shard` so far.
    ///
    /// Reads the gathered snapshot, so querying a shard that never received
    /// traffic does not create an empty series.
    pub fn requests_for(&self, shard: &str) -> u64 {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.name() == "shard_router_requests_total")
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|label| label.name() == "shard" && label.value() == shard)
            })
            .map_or(0, |metric| metric.get_counter().value() as u64)
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
