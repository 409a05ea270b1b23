//! Engine metrics.
//!
//! Counters and histograms are module-level statics so the worker can stamp
//! them without plumbing; the host process decides whether and how to
//! expose them (the engine has no HTTP surface of its own).

use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::GaugeVec;
use prometheus::HistogramOpts;
use prometheus::HistogramVec;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;

lazy_static! {
    pub static ref INDICATIONS_DELIVERED_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("indications_delivered_total", "Indications delivered to the broker"),
        &["indication_type"]
    )
    .expect("metric can not be created");

    pub static ref INDICATION_DELIVERY_FAILURES_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("indication_delivery_failures_total", "Indication deliveries rejected by the broker"),
        &["indication_type"]
    )
    .expect("metric can not be created");

    pub static ref POLL_CYCLES_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("poll_cycles_total", "Completed poll-and-diff cycles"),
        &["class"]
    )
    .expect("metric can not be created");

    pub static ref POLL_CYCLE_DURATION_METRIC: HistogramVec = HistogramVec::new(
        HistogramOpts::new("poll_cycle_duration_ms", "Histogram of poll cycle duration in ms")
            .buckets(exponential_buckets(1.0, 2.0, 12).unwrap()),
        &["class"]
    )
    .expect("metric can not be created");

    pub static ref ACTIVE_FILTERS_METRIC: GaugeVec = GaugeVec::new(
        Opts::new("active_filters", "Currently registered subscription filters"),
        &["class"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(INDICATIONS_DELIVERED_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(INDICATION_DELIVERY_FAILURES_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(POLL_CYCLES_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(POLL_CYCLE_DURATION_METRIC.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(ACTIVE_FILTERS_METRIC.clone()))
        .expect("collector can be registered");
}

/// Register the engine metrics on the module registry. Call once from the
/// host during provider initialization.
pub fn init_metrics() {
    register_custom_metrics(&REGISTRY);
}

/// Text exposition of the module registry, for hosts that scrape through
/// their own endpoint.
pub fn metrics_text() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}

#[cfg(test)]
mod metrics_test;
