//! Prometheus metrics for visibility decisions.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec, TextEncoder};

/// Single-record decisions by outcome and deciding path.
pub static VISIBILITY_DECISIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crm_visibility_decisions_total",
        "Total number of record visibility decisions",
        &["outcome", "path"] // unrestricted, granted, denied, data_error
    )
    .expect("Failed to register crm_visibility_decisions_total")
});

/// Bulk filters built, by shape.
pub static FILTERS_BUILT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crm_filters_built_total",
        "Total number of bulk visibility filters built",
        &["shape"] // match_all, match_none, any_of
    )
    .expect("Failed to register crm_filters_built_total")
});

/// Store lookups that failed and were treated as "no match".
pub static STORE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crm_store_errors_total",
        "Total number of failed hierarchy store lookups",
        &["operation"]
    )
    .expect("Failed to register crm_store_errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&VISIBILITY_DECISIONS_TOTAL);
    Lazy::force(&FILTERS_BUILT_TOTAL);
    Lazy::force(&STORE_ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

pub(crate) fn record_store_error(operation: &str) {
    STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}
