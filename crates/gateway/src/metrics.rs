use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::time::Duration;

/// Request counters; no-ops until a meter provider is installed.
#[derive(Clone)]
pub struct GatewayMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
}

impl GatewayMetrics {
    pub fn new(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 7.5, 10.0, 20.0, 30.0,
        ];
        let duration = meter
            .f64_histogram("gateway_request_duration_seconds")
            .with_description("Time to serve a detection request, staging and cleanup included")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build();
        let requests = meter
            .u64_counter("gateway_requests_total")
            .with_description("Total detection requests by outcome")
            .build();

        Self { requests, duration }
    }

    pub fn record(&self, outcome: &'static str, elapsed: Duration) {
        let attributes = [KeyValue::new("outcome", outcome)];
        self.requests.add(1, &attributes);
        self.duration.record(elapsed.as_secs_f64(), &attributes);
    }
}
