use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Game Metrics
    pub static ref SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sessions_total",
        "Total number of play sessions",
        &["status"]
    )
    .unwrap();

    pub static ref ROUNDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "rounds_total",
        "Total number of resolved rounds",
        &["outcome"]
    )
    .unwrap();

    // Generator Metrics
    pub static ref GENERATOR_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "generator_requests_total",
        "Total number of feedback generation requests",
        &["variant", "status"]
    )
    .unwrap();

    pub static ref SSE_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "sse_connections_active",
        "Number of active SSE countdown streams"
    )
    .unwrap();

    // Community Metrics
    pub static ref FEEDBACK_VOTES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feedback_votes_total",
        "Total number of votes on feedback lines",
        &["direction"]
    )
    .unwrap();

    pub static ref SUGGESTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "suggestions_total",
        "Total number of community suggestions submitted",
        &["kind"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let _ = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/health", "200"])
            .get();
        let _ = ROUNDS_TOTAL.with_label_values(&["correct"]).get();
    }

    #[test]
    fn test_render_metrics() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let result = render_metrics();
        assert!(result.is_ok());
        assert!(result.unwrap().contains("http_requests_total"));
    }
}
