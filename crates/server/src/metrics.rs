//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Where2 server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Suggestion runs by endpoint and outcome
//! - LLM conversation turns, token usage and repair passes

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use where2_core::suggest::RunStats;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "where2_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
        ]),
        &["method", "path", "status"],
    )
    .expect("valid metric")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("where2_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid metric")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "where2_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid metric")
});

// =============================================================================
// Suggestion Metrics
// =============================================================================

/// Suggestion runs by endpoint and outcome (`ok` or an error kind).
pub static SUGGEST_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("where2_suggest_runs_total", "Suggestion runs by outcome"),
        &["endpoint", "outcome"],
    )
    .expect("valid metric")
});

/// Suggestion run duration in seconds (successful runs).
pub static SUGGEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "where2_suggest_duration_seconds",
            "Duration of successful suggestion runs",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0]),
        &["endpoint"],
    )
    .expect("valid metric")
});

/// Model turns per conversation.
pub static LLM_ITERATIONS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "where2_llm_conversation_iterations",
            "Model turns per conversation",
        )
        .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 8.0, 10.0]),
        &["purpose"],
    )
    .expect("valid metric")
});

/// LLM tokens by model and direction.
pub static LLM_TOKENS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("where2_llm_tokens_total", "LLM tokens used"),
        &["model", "direction"],
    )
    .expect("valid metric")
});

/// Fill passes by result (`repaired` or `kept_initial`).
pub static REPAIR_PASSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "where2_repair_passes_total",
            "Missing-field fill passes by result",
        ),
        &["result"],
    )
    .expect("valid metric")
});

/// Activities in the in-memory store.
pub static ACTIVITIES_STORED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "where2_activities_stored",
        "Number of activities in the in-memory store",
    )
    .expect("valid metric")
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(SUGGEST_RUNS_TOTAL.clone()),
        Box::new(SUGGEST_DURATION.clone()),
        Box::new(LLM_ITERATIONS.clone()),
        Box::new(LLM_TOKENS_TOTAL.clone()),
        Box::new(REPAIR_PASSES_TOTAL.clone()),
        Box::new(ACTIVITIES_STORED.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::error!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record a successful run.
pub fn record_run(endpoint: &str, stats: &RunStats) {
    SUGGEST_RUNS_TOTAL
        .with_label_values(&[endpoint, "ok"])
        .inc();
    SUGGEST_DURATION
        .with_label_values(&[endpoint])
        .observe(stats.duration.as_secs_f64());
    LLM_ITERATIONS
        .with_label_values(&["suggest"])
        .observe(stats.iterations as f64);

    if stats.missing_fields > 0 {
        let result = if stats.repaired {
            "repaired"
        } else {
            "kept_initial"
        };
        REPAIR_PASSES_TOTAL.with_label_values(&[result]).inc();
        if stats.fill_iterations > 0 {
            LLM_ITERATIONS
                .with_label_values(&["fill"])
                .observe(stats.fill_iterations as f64);
        }
    }

    LLM_TOKENS_TOTAL
        .with_label_values(&[&stats.model, "input"])
        .inc_by(stats.usage.input_tokens as u64);
    LLM_TOKENS_TOTAL
        .with_label_values(&[&stats.model, "output"])
        .inc_by(stats.usage.output_tokens as u64);
}

/// Record a failed run.
pub fn record_failure(endpoint: &str, kind: &str) {
    SUGGEST_RUNS_TOTAL
        .with_label_values(&[endpoint, kind])
        .inc();
}

/// Routes with a fixed path.
const KNOWN_PATHS: [&str; 7] = [
    "/healthz",
    "/suggest",
    "/suggest-o3",
    "/mock-delay",
    "/config",
    "/metrics",
    "/activity",
];

/// Normalize a path for metric labels.
///
/// Activity ids collapse to `{id}`; unknown paths collapse to `unmatched`, which
/// keeps the label set bounded.
pub fn normalize_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/activity/") {
        if !rest.is_empty() && !rest.contains('/') {
            return "/activity/{id}".to_string();
        }
    }
    if KNOWN_PATHS.contains(&path) {
        return path.to_string();
    }
    "unmatched".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use where2_core::llm::LlmUsage;

    #[test]
    fn test_normalize_path_activity_id() {
        assert_eq!(normalize_path("/activity/act_01"), "/activity/{id}");
        assert_eq!(
            normalize_path("/activity/mock-activity-2"),
            "/activity/{id}"
        );
    }

    #[test]
    fn test_normalize_path_known_and_unknown() {
        assert_eq!(normalize_path("/suggest-o3"), "/suggest-o3");
        assert_eq!(normalize_path("/healthz"), "/healthz");
        assert_eq!(normalize_path("/wp-admin/login.php"), "unmatched");
        assert_eq!(normalize_path("/activity/a/b"), "unmatched");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("where2_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_record_run() {
        let stats = RunStats {
            model: "metrics-test-model".to_string(),
            iterations: 2,
            fill_iterations: 1,
            missing_fields: 3,
            repaired: true,
            usage: LlmUsage {
                input_tokens: 100,
                output_tokens: 40,
            },
            duration: Duration::from_secs(4),
            ..Default::default()
        };
        record_run("/suggest", &stats);
        record_failure("/suggest", "weather");

        assert_eq!(
            LLM_TOKENS_TOTAL
                .with_label_values(&["metrics-test-model", "input"])
                .get(),
            100
        );

        let output = encode_metrics();
        assert!(output.contains("where2_suggest_runs_total"));
        assert!(output.contains("where2_repair_passes_total"));
        assert!(output.contains("where2_llm_conversation_iterations"));
        assert!(output.contains("outcome=\"weather\""));
    }
}
