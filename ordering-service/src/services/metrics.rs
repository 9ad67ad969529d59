//! Prometheus metrics for ordering-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    HistogramVec, TextEncoder,
};

/// Orders accepted by create.
pub static ORDERS_CREATED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "ordering_orders_created_total",
        "Total number of orders created"
    )
    .expect("Failed to register orders_created_total")
});

/// Applied status changes. Self-transitions are not counted.
pub static STATUS_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ordering_status_transitions_total",
        "Total number of order status transitions",
        &["from", "to"]
    )
    .expect("Failed to register status_transitions_total")
});

pub static ORDERS_DELETED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "ordering_orders_deleted_total",
        "Total number of orders deleted"
    )
    .expect("Failed to register orders_deleted_total")
});

/// Authorization denials by action.
pub static AUTHORIZATION_DENIALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ordering_authorization_denials_total",
        "Total number of denied authorization checks",
        &["action"]
    )
    .expect("Failed to register authorization_denials_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ordering_errors_total",
        "Total number of lifecycle errors by kind",
        &["kind"]
    )
    .expect("Failed to register errors_total")
});

/// Lifecycle operation duration, collaborator calls included.
pub static OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "ordering_operation_duration_seconds",
        "Order lifecycle operation duration in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register operation_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&ORDERS_CREATED_TOTAL);
    Lazy::force(&STATUS_TRANSITIONS_TOTAL);
    Lazy::force(&ORDERS_DELETED_TOTAL);
    Lazy::force(&AUTHORIZATION_DENIALS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&OPERATION_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_are_exported_after_init() {
        init_metrics();
        STATUS_TRANSITIONS_TOTAL
            .with_label_values(&["pendiente", "pagado"])
            .inc();
        ERRORS_TOTAL.with_label_values(&["order_not_found"]).inc();

        let text = get_metrics();
        assert!(text.contains("ordering_status_transitions_total"));
        assert!(text.contains("ordering_errors_total"));
        assert!(text.contains("ordering_orders_created_total"));
    }
}
