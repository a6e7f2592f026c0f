//! Derived checkpoint metrics
//!
//! Rates are percentages on a 0-100 scale. A missing counter or a zero
//! denominator yields `None`; no function here produces NaN or infinity.

use serde::Serialize;

use super::signal::SignalInputs;
use crate::data::Checkpoint;

fn ratio_percent(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator * 100.0 / denominator)
}

fn nonzero_views(checkpoint: &Checkpoint) -> Option<f64> {
    checkpoint.views.filter(|views| *views != 0).map(|views| views as f64)
}

/// `(likes + comments + shares) / views * 100`
pub fn engagement_rate(checkpoint: &Checkpoint) -> Option<f64> {
    let views = nonzero_views(checkpoint)?;
    let interactions =
        checkpoint.likes? as f64 + checkpoint.comments? as f64 + checkpoint.shares? as f64;
    ratio_percent(interactions, views)
}

/// `shares / views * 100`
pub fn share_rate(checkpoint: &Checkpoint) -> Option<f64> {
    let views = nonzero_views(checkpoint)?;
    ratio_percent(checkpoint.shares? as f64, views)
}

/// `new_followers / views * 100`
pub fn follower_conversion(checkpoint: &Checkpoint) -> Option<f64> {
    let views = nonzero_views(checkpoint)?;
    ratio_percent(checkpoint.new_followers? as f64, views)
}

/// `average_watch_time_seconds / duration_seconds * 100`
pub fn retention_rate(checkpoint: &Checkpoint, duration_seconds: Option<i64>) -> Option<f64> {
    let watch_time = checkpoint
        .average_watch_time_seconds
        .filter(|seconds| *seconds != 0.0)?;
    let duration = duration_seconds.filter(|seconds| *seconds != 0)?;
    ratio_percent(watch_time, duration as f64)
}

/// Stored completion fraction expressed as a percentage for display
pub fn completion_percent(checkpoint: &Checkpoint) -> Option<f64> {
    checkpoint
        .completion_rate
        .filter(|rate| rate.is_finite())
        .map(|rate| rate * 100.0)
}

/// All derived metrics of one checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CheckpointMetrics {
    pub engagement_rate: Option<f64>,
    pub share_rate: Option<f64>,
    pub follower_conversion: Option<f64>,
    pub retention_rate: Option<f64>,
    pub completion_rate: Option<f64>,
}

impl CheckpointMetrics {
    /// Derive every metric for a checkpoint of a post with the given duration
    pub fn derive(checkpoint: &Checkpoint, duration_seconds: Option<i64>) -> Self {
        Self {
            engagement_rate: engagement_rate(checkpoint),
            share_rate: share_rate(checkpoint),
            follower_conversion: follower_conversion(checkpoint),
            retention_rate: retention_rate(checkpoint, duration_seconds),
            completion_rate: completion_percent(checkpoint),
        }
    }

    pub fn signal_inputs(&self) -> SignalInputs {
        SignalInputs {
            completion_rate: self.completion_rate,
            share_rate: self.share_rate,
            follower_conversion: self.follower_conversion,
            engagement_rate: self.engagement_rate,
        }
    }
}
