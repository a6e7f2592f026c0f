//! Checkpoint scheduling and metrics engine
//!
//! Pure, synchronous logic with no I/O:
//! - `catalog`: checkpoint kinds and their thresholds
//! - `schedule`: expected / missed / upcoming evaluation
//! - `metrics`: derived rates from raw counters
//! - `signal`: positive / negative / neutral classification
//! - `delta`: checkpoint-to-checkpoint changes and formatting
//! - `notification`: the prioritized notification feed
//! - `tag_merge`: planning of tag merges

mod catalog;
mod delta;
mod metrics;
mod notification;
mod schedule;
mod signal;
mod tag_merge;

pub use catalog::{CheckpointKind, UnknownCheckpointKind};
pub use delta::{
    DELTA_PLACEHOLDER, DeltaStyle, Direction, Metric, MetricDelta, MetricDeltas,
    checkpoint_deltas, format_delta, metric_delta, sequence_deltas, timeline_deltas,
};
pub use metrics::{
    CheckpointMetrics, completion_percent, engagement_rate, follower_conversion, retention_rate,
    share_rate,
};
pub use notification::{
    FeedSettings, MISSED_CHECKPOINT_PRIORITY, Notification, NotificationKind,
    POSITIVE_SIGNAL_PRIORITY, SuggestedAction, UPCOMING_PRIORITY, build_feed,
    post_notifications, sort_feed,
};
pub use schedule::{
    CapturedKinds, CheckpointStatus, PostSchedule, TimelineEntry, captured_kinds, expected_kinds,
    missed_kinds, next_suggested_kind, status_of,
};
pub use signal::{Signal, SignalInputs, classify};
pub use tag_merge::{
    MergeSide, MergeStep, TagMergeOutcome, TagMergePlan, normalize_tag_name, plan_tag_merge,
    validate_merge_request,
};
