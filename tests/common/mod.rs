//! Common test utilities for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tempfile::TempDir;

use checkpointer::clock::FixedClock;
use checkpointer::config;
use checkpointer::data::{Checkpoint, CheckpointInput, EntityId, Post, PostStatus};
use checkpointer::engine::CheckpointKind;
use checkpointer::AppState;

/// Test application with a temporary database and a frozen clock
pub struct TestContext {
    pub state: AppState,
    pub now: DateTime<Utc>,
    pub _temp_dir: TempDir,
}

/// Instant every test clock is frozen at
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn test_config(temp_dir: &TempDir) -> config::AppConfig {
    config::AppConfig {
        database: config::DatabaseConfig {
            path: temp_dir.path().join("test.db"),
        },
        logging: config::LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        notifications: config::NotificationConfig::default(),
    }
}

impl TestContext {
    /// Create a new test context with default notification settings
    pub async fn new() -> Self {
        Self::with_notifications(config::NotificationConfig::default()).await
    }

    /// Create a new test context with custom notification settings
    pub async fn with_notifications(notifications: config::NotificationConfig) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.notifications = notifications;

        let now = test_now();
        let state = AppState::with_clock(config, Arc::new(FixedClock(now)))
            .await
            .unwrap();

        Self {
            state,
            now,
            _temp_dir: temp_dir,
        }
    }

    /// Insert a post; `published_ago` of `None` leaves it unpublished
    pub async fn create_post(&self, title: &str, published_ago: Option<Duration>) -> Post {
        let post = Post {
            id: EntityId::new().0,
            title: title.to_string(),
            status: match published_ago {
                Some(_) => PostStatus::Published.as_str().to_string(),
                None => PostStatus::Unpublished.as_str().to_string(),
            },
            published_at: published_ago.map(|ago| self.now - ago),
            duration_seconds: Some(60),
            created_at: self.now - Duration::days(60),
        };
        self.state.db.insert_post(&post).await.unwrap();
        post
    }

    /// Insert a checkpoint captured at an explicit instant
    pub async fn insert_checkpoint(
        &self,
        post_id: &str,
        kind: CheckpointKind,
        input: CheckpointInput,
        captured_at: DateTime<Utc>,
    ) -> Checkpoint {
        let checkpoint = input.into_checkpoint(post_id.to_string(), kind, captured_at);
        self.state.db.insert_checkpoint(&checkpoint).await.unwrap();
        checkpoint
    }
}

/// Counters that classify as a positive signal (completion 60%)
pub fn positive_input(views: i64) -> CheckpointInput {
    CheckpointInput {
        views: Some(views),
        likes: Some(views / 10),
        comments: Some(views / 20),
        shares: Some(views / 100),
        completion_rate: Some(0.6),
        ..Default::default()
    }
}

/// Counters that classify as neutral
pub fn neutral_input(views: i64) -> CheckpointInput {
    CheckpointInput {
        views: Some(views),
        likes: Some(views / 10),
        comments: Some(0),
        shares: Some(views / 100),
        new_followers: Some(0),
        completion_rate: Some(0.3),
        ..Default::default()
    }
}
