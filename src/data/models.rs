//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::CheckpointKind;
use crate::error::AppError;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Post
// =============================================================================

/// A tracked video post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Lifecycle: unpublished, published, archived
    pub status: String,
    /// Set iff the post is published
    pub published_at: Option<DateTime<Utc>>,
    /// Nominal video length in seconds
    pub duration_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn lifecycle(&self) -> Option<PostStatus> {
        PostStatus::parse(&self.status)
    }

    pub fn is_published(&self) -> bool {
        self.lifecycle() == Some(PostStatus::Published)
    }
}

/// Post lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Unpublished,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpublished => "unpublished",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unpublished" => Some(Self::Unpublished),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

// =============================================================================
// Checkpoint
// =============================================================================

/// One capture of a post's performance counters
///
/// At most one checkpoint exists per (post, kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Checkpoint {
    pub id: String,
    pub post_id: String,
    /// Checkpoint kind label ("1h", "1d", ...)
    pub kind: String,
    pub captured_at: DateTime<Utc>,
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
    pub favorites: Option<i64>,
    pub new_followers: Option<i64>,
    pub profile_views: Option<i64>,
    pub reach: Option<i64>,
    pub total_play_time_seconds: Option<i64>,
    pub average_watch_time_seconds: Option<f64>,
    /// Fraction of viewers who watched to the end (0-1)
    pub completion_rate: Option<f64>,
}

impl Checkpoint {
    pub fn checkpoint_kind(&self) -> Option<CheckpointKind> {
        CheckpointKind::from_label(&self.kind)
    }
}

/// Raw counters entered for a new checkpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointInput {
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
    pub favorites: Option<i64>,
    pub new_followers: Option<i64>,
    pub profile_views: Option<i64>,
    pub reach: Option<i64>,
    pub total_play_time_seconds: Option<i64>,
    pub average_watch_time_seconds: Option<f64>,
    pub completion_rate: Option<f64>,
}

impl CheckpointInput {
    /// Reject negative counters and out-of-range rates
    pub fn validate(&self) -> Result<(), AppError> {
        let counters = [
            ("views", self.views),
            ("likes", self.likes),
            ("comments", self.comments),
            ("shares", self.shares),
            ("favorites", self.favorites),
            ("new_followers", self.new_followers),
            ("profile_views", self.profile_views),
            ("reach", self.reach),
            ("total_play_time_seconds", self.total_play_time_seconds),
        ];

        if let Some((name, _)) = counters
            .iter()
            .find(|(_, value)| value.is_some_and(|value| value < 0))
        {
            return Err(AppError::Validation(format!("{name} must not be negative")));
        }

        if let Some(seconds) = self.average_watch_time_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(AppError::Validation(
                    "average_watch_time_seconds must be a non-negative number".to_string(),
                ));
            }
        }

        if let Some(rate) = self.completion_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(AppError::Validation(
                    "completion_rate must be between 0 and 1".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Build a checkpoint row with a fresh ID
    pub fn into_checkpoint(
        self,
        post_id: String,
        kind: CheckpointKind,
        captured_at: DateTime<Utc>,
    ) -> Checkpoint {
        Checkpoint {
            id: EntityId::new().0,
            post_id,
            kind: kind.label().to_string(),
            captured_at,
            views: self.views,
            likes: self.likes,
            comments: self.comments,
            shares: self.shares,
            favorites: self.favorites,
            new_followers: self.new_followers,
            profile_views: self.profile_views,
            reach: self.reach,
            total_play_time_seconds: self.total_play_time_seconds,
            average_watch_time_seconds: self.average_watch_time_seconds,
            completion_rate: self.completion_rate,
        }
    }
}

/// A post together with its checkpoints, ordered by capture time ascending
#[derive(Debug, Clone, Serialize)]
pub struct PostWithCheckpoints {
    pub post: Post,
    pub checkpoints: Vec<Checkpoint>,
}

// =============================================================================
// Tags
// =============================================================================

/// A normalized label (lowercase, trimmed, unique)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Post <-> tag association
///
/// Unique per (post, tag); `position` orders a post's tags for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostTag {
    pub post_id: String,
    pub tag_id: String,
    pub position: i64,
}
