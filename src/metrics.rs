//! Prometheus counters for resource operations.

use metrics::{counter, describe_counter};
use tracing::debug;

// === Metric Name Constants ===

/// Samples created counter metric name.
pub const METRIC_SAMPLES_CREATED: &str = "samples_created_total";
/// Samples updated counter metric name.
pub const METRIC_SAMPLES_UPDATED: &str = "samples_updated_total";
/// Samples deleted counter metric name.
pub const METRIC_SAMPLES_DELETED: &str = "samples_deleted_total";
/// Tests created counter metric name.
pub const METRIC_TESTS_CREATED: &str = "tests_created_total";
/// Tests updated counter metric name.
pub const METRIC_TESTS_UPDATED: &str = "tests_updated_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_SAMPLES_CREATED, "Total number of samples created");
    describe_counter!(METRIC_SAMPLES_UPDATED, "Total number of samples updated");
    describe_counter!(METRIC_SAMPLES_DELETED, "Total number of samples deleted");
    describe_counter!(METRIC_TESTS_CREATED, "Total number of tests created");
    describe_counter!(METRIC_TESTS_UPDATED, "Total number of tests updated");

    debug!("Metrics initialized");
}

/// Increment samples created counter.
pub fn inc_samples_created() {
    counter!(METRIC_SAMPLES_CREATED).increment(1);
}

/// Increment samples updated counter.
pub fn inc_samples_updated() {
    counter!(METRIC_SAMPLES_UPDATED).increment(1);
}

/// Increment samples deleted counter.
pub fn inc_samples_deleted() {
    counter!(METRIC_SAMPLES_DELETED).increment(1);
}

/// Increment tests created counter.
pub fn inc_tests_created() {
    counter!(METRIC_TESTS_CREATED).increment(1);
}

/// Increment tests updated counter.
pub fn inc_tests_updated() {
    counter!(METRIC_TESTS_UPDATED).increment(1);
}
