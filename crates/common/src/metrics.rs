use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "shiteni_http_requests_total",
        "HTTP requests handled, by response status class",
        &["class"]
    )
    .expect("register http_requests_total")
});

pub static BOOKINGS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("shiteni_bookings_created_total", "Hotel bookings created")
        .expect("register bookings_created_total")
});

pub static SALES_RECORDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("shiteni_sales_recorded_total", "Store and pharmacy sales recorded")
        .expect("register sales_recorded_total")
});

pub static TICKETS_ISSUED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("shiteni_tickets_issued_total", "Bus tickets issued")
        .expect("register tickets_issued_total")
});

pub static PAYMENT_ATTEMPTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("shiteni_payment_attempts_total", "Calls made to the payment gateway")
        .expect("register payment_attempts_total")
});

pub static PAYMENT_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("shiteni_payment_failures_total", "Charges that ended failed or errored")
        .expect("register payment_failures_total")
});

pub static DASHBOARD_CACHE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "shiteni_dashboard_cache_total",
        "Dashboard cache lookups, by outcome",
        &["outcome"]
    )
    .expect("register dashboard_cache_total")
});

/// Map a status code to its `NXX` class label.
pub fn status_class(code: u16) -> &'static str {
    match code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        assert_eq!(status_class(204), "2xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(503), "5xx");
    }

    #[test]
    fn encoded_metrics_include_counters() {
        BOOKINGS_CREATED_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("shiteni_bookings_created_total"));
    }
}
