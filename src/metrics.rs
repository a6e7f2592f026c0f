//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Once;

use crate::error::AppError;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Notification Metrics
    pub static ref NOTIFICATIONS_GENERATED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("checkpointer_notifications_generated_total", "Total number of notifications generated"),
        &["kind"]
    ).expect("metric can be created");
    pub static ref NOTIFICATION_FEED_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "checkpointer_notification_feed_duration_seconds",
            "Notification feed build duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
    ).expect("metric can be created");

    // Tag Metrics
    pub static ref TAG_MERGES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("checkpointer_tag_merges_total", "Total number of tag merges"),
        &["status"]
    ).expect("metric can be created");

    // Checkpoint Metrics
    pub static ref CHECKPOINTS_CAPTURED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("checkpointer_checkpoints_captured_total", "Total number of checkpoints captured"),
        &["kind"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("checkpointer_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(NOTIFICATIONS_GENERATED_TOTAL.clone()))
            .expect("NOTIFICATIONS_GENERATED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(NOTIFICATION_FEED_DURATION_SECONDS.clone()))
            .expect("NOTIFICATION_FEED_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(TAG_MERGES_TOTAL.clone()))
            .expect("TAG_MERGES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(CHECKPOINTS_CAPTURED_TOTAL.clone()))
            .expect("CHECKPOINTS_CAPTURED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");
    });
}

/// Count a failed operation by error type
pub fn record_error(error: &AppError) {
    ERRORS_TOTAL.with_label_values(&[error.error_type()]).inc();
}

/// Encode the registry in the Prometheus text exposition format
pub fn gather_text() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Metrics are not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_exports_counters() {
        init_metrics();
        init_metrics();

        CHECKPOINTS_CAPTURED_TOTAL.with_label_values(&["1h"]).inc();
        record_error(&AppError::NotFound);

        let text = gather_text().unwrap();
        assert!(text.contains("checkpointer_checkpoints_captured_total"));
        assert!(text.contains("error_type=\"not_found\""));
    }
}
