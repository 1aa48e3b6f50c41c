//! # Metrics
//!
//! Prometheus metrics for remote Secrets Manager operations.
//!
//! ## Metrics Exposed
//!
//! - `sm_en_registration_operations_total` - Remote operations by operation name, failed ones included
//! - `sm_en_registration_operation_duration_seconds` - Duration of remote operations
//! - `sm_en_registration_operation_errors_total` - Failed remote operations by operation name
//! - `sm_en_registration_not_found_total` - Reads that found no registration

use anyhow::Result;
use prometheus::{HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REGISTER: Once = Once::new();

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "sm_en_registration_operations_total",
            "Total number of Secrets Manager operations by operation name",
        ),
        &["operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "sm_en_registration_operation_duration_seconds",
            "Duration of Secrets Manager operations in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0]),
        &["operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "sm_en_registration_operation_errors_total",
            "Total number of failed Secrets Manager operations by operation name",
        ),
        &["operation"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static NOT_FOUND_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sm_en_registration_not_found_total",
        "Total number of reads that found no registration",
    )
    .expect("Failed to create NOT_FOUND_TOTAL metric - this should never happen")
});

/// Register all metrics with the crate registry
///
/// Safe to call more than once; only the first call registers.
///
/// # Errors
/// Returns an error if a metric cannot be registered
pub fn register_metrics() -> Result<()> {
    let mut result = Ok(());
    REGISTER.call_once(|| {
        result = (|| -> Result<()> {
            REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
            REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
            REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
            REGISTRY.register(Box::new(NOT_FOUND_TOTAL.clone()))?;
            Ok(())
        })();
    });
    result
}

pub fn record_operation(operation: &str, duration_secs: f64) {
    OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

pub fn increment_operation_errors(operation: &str) {
    OPERATION_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn increment_not_found() {
    NOT_FOUND_TOTAL.inc();
}

pub fn operations_total(operation: &str) -> u64 {
    OPERATIONS_TOTAL.with_label_values(&[operation]).get()
}

pub fn operation_errors_total(operation: &str) -> u64 {
    OPERATION_ERRORS_TOTAL.with_label_values(&[operation]).get()
}

pub fn operation_duration_count(operation: &str) -> u64 {
    OPERATION_DURATION
        .with_label_values(&[operation])
        .get_sample_count()
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    Ok(encoder.encode_to_string(&families)?)
}
