//! Checkpoint-to-checkpoint deltas
//!
//! Compares raw counters between consecutive captures of the same post and
//! renders the change for display.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::Checkpoint;

/// Placeholder rendered when no delta is available
pub const DELTA_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    fn of(value: f64) -> Self {
        if value > 0.0 {
            Self::Up
        } else if value < 0.0 {
            Self::Down
        } else {
            Self::Neutral
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Neutral => "→",
        }
    }
}

/// Change of one metric between two checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    /// Current value
    pub value: f64,
    pub absolute: f64,
    /// Relative change in percent; `None` only when no previous value exists
    pub percentage: Option<f64>,
    pub direction: Direction,
}

/// Compare two values of the same metric.
///
/// Returns `None` when either side is unavailable. A zero previous value
/// reports 100% growth for any positive current value and 0% otherwise.
pub fn metric_delta(current: Option<f64>, previous: Option<f64>) -> Option<MetricDelta> {
    let current = current?;
    let previous = previous?;

    let absolute = current - previous;
    let percentage = if previous == 0.0 {
        if current > 0.0 { 100.0 } else { 0.0 }
    } else {
        absolute / previous * 100.0
    };

    Some(MetricDelta {
        value: current,
        absolute,
        percentage: Some(percentage),
        direction: Direction::of(absolute),
    })
}

/// Raw checkpoint fields that deltas are computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Shares,
    Favorites,
    NewFollowers,
    ProfileViews,
    Reach,
    TotalPlayTimeSeconds,
    AverageWatchTimeSeconds,
    CompletionRate,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Self::Views,
        Self::Likes,
        Self::Comments,
        Self::Shares,
        Self::Favorites,
        Self::NewFollowers,
        Self::ProfileViews,
        Self::Reach,
        Self::TotalPlayTimeSeconds,
        Self::AverageWatchTimeSeconds,
        Self::CompletionRate,
    ];

    /// Read this metric from a checkpoint
    pub fn value_of(self, checkpoint: &Checkpoint) -> Option<f64> {
        let counter = |value: Option<i64>| value.map(|value| value as f64);
        match self {
            Self::Views => counter(checkpoint.views),
            Self::Likes => counter(checkpoint.likes),
            Self::Comments => counter(checkpoint.comments),
            Self::Shares => counter(checkpoint.shares),
            Self::Favorites => counter(checkpoint.favorites),
            Self::NewFollowers => counter(checkpoint.new_followers),
            Self::ProfileViews => counter(checkpoint.profile_views),
            Self::Reach => counter(checkpoint.reach),
            Self::TotalPlayTimeSeconds => counter(checkpoint.total_play_time_seconds),
            Self::AverageWatchTimeSeconds => checkpoint.average_watch_time_seconds,
            Self::CompletionRate => checkpoint.completion_rate,
        }
    }
}

/// Per-metric deltas; metrics missing on either side are absent
pub type MetricDeltas = BTreeMap<Metric, MetricDelta>;

/// Deltas between two checkpoints
pub fn checkpoint_deltas(current: &Checkpoint, previous: &Checkpoint) -> MetricDeltas {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            metric_delta(metric.value_of(current), metric.value_of(previous))
                .map(|delta| (metric, delta))
        })
        .collect()
}

/// Deltas of the checkpoint at `index` (default: last) against its predecessor.
///
/// `None` when there are fewer than two checkpoints, when `index` is 0 or
/// out of range.
pub fn sequence_deltas(checkpoints: &[Checkpoint], index: Option<usize>) -> Option<MetricDeltas> {
    if checkpoints.len() < 2 {
        return None;
    }

    let index = index.unwrap_or(checkpoints.len() - 1);
    if index == 0 || index >= checkpoints.len() {
        return None;
    }

    Some(checkpoint_deltas(
        &checkpoints[index],
        &checkpoints[index - 1],
    ))
}

/// Deltas for every checkpoint after the first, in sequence order
pub fn timeline_deltas(checkpoints: &[Checkpoint]) -> Vec<MetricDeltas> {
    (1..checkpoints.len())
        .filter_map(|index| sequence_deltas(checkpoints, Some(index)))
        .collect()
}

/// How a delta is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaStyle {
    /// `+500 (+50.0%)`
    #[default]
    Full,
    /// `+500`
    Absolute,
    /// `↑ 50.0%`
    Percentage,
}

fn sign(value: f64) -> &'static str {
    if value > 0.0 { "+" } else { "" }
}

fn format_number(value: f64) -> String {
    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    match rendered {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn format_percentage(value: f64) -> String {
    let rendered = format!("{value:.1}");
    if rendered == "-0.0" {
        "0.0".to_string()
    } else {
        rendered
    }
}

/// Render a delta for display
pub fn format_delta(delta: Option<&MetricDelta>, style: DeltaStyle) -> String {
    let Some(delta) = delta else {
        return DELTA_PLACEHOLDER.to_string();
    };

    let absolute = format!("{}{}", sign(delta.absolute), format_number(delta.absolute));

    match (style, delta.percentage) {
        (DeltaStyle::Absolute, _) | (DeltaStyle::Full, None) => absolute,
        (DeltaStyle::Full, Some(percentage)) => format!(
            "{absolute} ({}{}%)",
            sign(percentage),
            format_percentage(percentage)
        ),
        (DeltaStyle::Percentage, Some(percentage)) => format!(
            "{} {}%",
            delta.direction.arrow(),
            format_percentage(percentage.abs())
        ),
        (DeltaStyle::Percentage, None) => DELTA_PLACEHOLDER.to_string(),
    }
}
