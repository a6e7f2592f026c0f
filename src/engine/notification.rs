//! Notification feed generation
//!
//! Builds the actionable feed for the dashboard from published posts and
//! their checkpoints. Notifications are value objects recomputed on every
//! request; nothing here is persisted.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::catalog::CheckpointKind;
use super::metrics::CheckpointMetrics;
use super::schedule::PostSchedule;
use super::signal::{Signal, classify};
use crate::data::{Checkpoint, PostWithCheckpoints};

pub const MISSED_CHECKPOINT_PRIORITY: u8 = 10;
pub const POSITIVE_SIGNAL_PRIORITY: u8 = 5;
pub const UPCOMING_PRIORITY: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MissedCheckpoint,
    Upcoming,
    PositiveSignal,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissedCheckpoint => "missed_checkpoint",
            Self::Upcoming => "upcoming",
            Self::PositiveSignal => "positive_signal",
        }
    }
}

/// What the user is nudged to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestedAction {
    CaptureCheckpoint {
        post_id: String,
        kind: CheckpointKind,
    },
    ViewPost {
        post_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Stable key: `{kind}:{post_id}` plus the checkpoint kind when relevant
    pub id: String,
    pub kind: NotificationKind,
    pub post_id: String,
    pub message: String,
    pub action: SuggestedAction,
    pub priority: u8,
    /// Tie-break ordering key, newest first
    pub timestamp: DateTime<Utc>,
}

/// Feed tuning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    /// Positive signals are only surfaced for posts published this recently
    pub positive_signal_window: Duration,
    /// Emit `Upcoming` for a kind falling due within this lead time
    pub upcoming_lead: Option<Duration>,
    /// Truncate the sorted feed
    pub max_items: Option<usize>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            positive_signal_window: Duration::days(7),
            upcoming_lead: None,
            max_items: None,
        }
    }
}

fn missed_checkpoint(
    post_id: &str,
    title: &str,
    kind: CheckpointKind,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id: format!(
            "{}:{}:{}",
            NotificationKind::MissedCheckpoint.as_str(),
            post_id,
            kind
        ),
        kind: NotificationKind::MissedCheckpoint,
        post_id: post_id.to_string(),
        message: format!("\"{title}\" is missing its {kind} checkpoint"),
        action: SuggestedAction::CaptureCheckpoint {
            post_id: post_id.to_string(),
            kind,
        },
        priority: MISSED_CHECKPOINT_PRIORITY,
        timestamp: now,
    }
}

fn upcoming(
    post_id: &str,
    title: &str,
    kind: CheckpointKind,
    due_at: DateTime<Utc>,
) -> Notification {
    Notification {
        id: format!("{}:{}:{}", NotificationKind::Upcoming.as_str(), post_id, kind),
        kind: NotificationKind::Upcoming,
        post_id: post_id.to_string(),
        message: format!("\"{title}\" is due for its {kind} checkpoint soon"),
        action: SuggestedAction::CaptureCheckpoint {
            post_id: post_id.to_string(),
            kind,
        },
        priority: UPCOMING_PRIORITY,
        timestamp: due_at,
    }
}

fn positive_signal(post_id: &str, title: &str, latest: &Checkpoint) -> Notification {
    Notification {
        id: format!("{}:{}", NotificationKind::PositiveSignal.as_str(), post_id),
        kind: NotificationKind::PositiveSignal,
        post_id: post_id.to_string(),
        message: format!(
            "\"{title}\" is showing a positive signal at its {} checkpoint",
            latest.kind
        ),
        action: SuggestedAction::ViewPost {
            post_id: post_id.to_string(),
        },
        priority: POSITIVE_SIGNAL_PRIORITY,
        timestamp: latest.captured_at,
    }
}

/// Signal of the most recent checkpoint, if the post has at least two
fn latest_signal(entry: &PostWithCheckpoints) -> Option<(&Checkpoint, Signal)> {
    if entry.checkpoints.len() < 2 {
        return None;
    }

    let latest = entry
        .checkpoints
        .iter()
        .max_by_key(|checkpoint| checkpoint.captured_at)?;
    let metrics = CheckpointMetrics::derive(latest, entry.post.duration_seconds);
    Some((latest, classify(&metrics.signal_inputs())))
}

/// Notifications for a single post
pub fn post_notifications(
    entry: &PostWithCheckpoints,
    now: DateTime<Utc>,
    settings: &FeedSettings,
) -> Vec<Notification> {
    let post = &entry.post;
    let Some(published_at) = post.published_at.filter(|_| post.is_published()) else {
        return Vec::new();
    };

    let schedule = PostSchedule::from_checkpoints(published_at, &entry.checkpoints, now);
    let mut notifications: Vec<Notification> = schedule
        .missed_kinds()
        .into_iter()
        .map(|kind| missed_checkpoint(&post.id, &post.title, kind, now))
        .collect();

    if let Some((latest, Signal::Positive)) = latest_signal(entry) {
        if now - published_at <= settings.positive_signal_window {
            notifications.push(positive_signal(&post.id, &post.title, latest));
        }
    }

    if let Some(lead) = settings.upcoming_lead {
        if let Some((kind, due_at)) = schedule.next_due() {
            if due_at - now <= lead {
                notifications.push(upcoming(&post.id, &post.title, kind, due_at));
            }
        }
    }

    notifications
}

/// Order notifications by priority, then by timestamp, both descending.
///
/// The sort is stable so equal keys keep generation order.
pub fn sort_feed(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}

/// Build the full, sorted feed across posts
pub fn build_feed(
    posts: &[PostWithCheckpoints],
    now: DateTime<Utc>,
    settings: &FeedSettings,
) -> Vec<Notification> {
    let mut feed: Vec<Notification> = posts
        .iter()
        .flat_map(|entry| post_notifications(entry, now, settings))
        .collect();

    sort_feed(&mut feed);

    if let Some(max_items) = settings.max_items {
        feed.truncate(max_items);
    }

    feed
}
