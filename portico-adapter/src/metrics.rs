//! Gateway metrics

use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static::lazy_static! {
    pub static ref GATEWAY_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "portico_gateway_requests_total",
        "Total gateway requests",
        &["transaction_type", "outcome"]
    )
    .unwrap();

    pub static ref GATEWAY_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "portico_gateway_request_duration_seconds",
        "Gateway request duration, reversal included",
        &["transaction_type"]
    )
    .unwrap();

    pub static ref REVERSALS_TOTAL: CounterVec = register_counter_vec!(
        "portico_gateway_reversals_total",
        "Automatic reversals sent after an ambiguous outcome",
        &["result"]
    )
    .unwrap();
}

/// Outcome label for a finished call
pub fn outcome_label(result: &crate::Result<crate::Response>) -> &'static str {
    match result {
        Ok(response) if response.is_successful() => "approved",
        Ok(_) => "declined",
        Err(e) if e.is_gateway_timeout() => "timeout",
        Err(crate::Error::Validation(_)) => "invalid",
        Err(_) => "error",
    }
}
