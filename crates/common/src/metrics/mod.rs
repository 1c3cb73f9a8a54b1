//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all Masdar metrics
pub const METRICS_PREFIX: &str = "masdar";

/// SLO-aligned histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Buckets for the synthesis call (typically slower)
pub const SYNTHESIS_BUCKETS: &[f64] = &[
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    20.00,  // 20s
    30.00,  // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_ask_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of ask requests"
    );

    describe_histogram!(
        format!("{}_ask_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end ask latency in seconds"
    );

    describe_counter!(
        format!("{}_ask_no_results_total", METRICS_PREFIX),
        Unit::Count,
        "Ask requests that produced no citations"
    );

    describe_gauge!(
        format!("{}_ask_citations_count", METRICS_PREFIX),
        Unit::Count,
        "Number of citations returned by the last ask"
    );

    describe_histogram!(
        format!("{}_retrieval_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Passage retrieval latency in seconds"
    );

    describe_counter!(
        format!("{}_retrieval_faults_total", METRICS_PREFIX),
        Unit::Count,
        "Retrieval faults degraded to empty result sets"
    );

    describe_histogram!(
        format!("{}_synthesis_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Synthesis call latency in seconds"
    );

    describe_counter!(
        format!("{}_synthesis_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Synthesis calls that fell back to the fixed unavailable text"
    );
}

/// Record an ask request outcome
pub fn record_ask(duration_secs: f64, citations: usize, no_results: bool) {
    counter!(format!("{}_ask_requests_total", METRICS_PREFIX)).increment(1);
    histogram!(format!("{}_ask_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    gauge!(format!("{}_ask_citations_count", METRICS_PREFIX)).set(citations as f64);

    if no_results {
        counter!(format!("{}_ask_no_results_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a retrieval pass
pub fn record_retrieval(duration_secs: f64) {
    histogram!(format!("{}_retrieval_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Record a retrieval fault that was degraded to an empty result set
pub fn record_retrieval_fault() {
    counter!(format!("{}_retrieval_faults_total", METRICS_PREFIX)).increment(1);
}

/// Record a synthesis call outcome
pub fn record_synthesis(duration_secs: f64, ok: bool) {
    histogram!(format!("{}_synthesis_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    if !ok {
        counter!(format!("{}_synthesis_failures_total", METRICS_PREFIX)).increment(1);
    }
}
