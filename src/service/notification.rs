//! Notification service
//!
//! Recomputes the notification feed from the store on every call.

use std::sync::Arc;

use crate::clock::Clock;
use crate::data::{Database, PostStatus};
use crate::engine::{FeedSettings, Notification, build_feed};
use crate::error::AppError;
use crate::metrics::{
    NOTIFICATION_FEED_DURATION_SECONDS, NOTIFICATIONS_GENERATED_TOTAL, record_error,
};

/// Notification service
pub struct NotificationService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    settings: FeedSettings,
}

impl NotificationService {
    /// Create new notification service
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>, settings: FeedSettings) -> Self {
        Self {
            db,
            clock,
            settings,
        }
    }

    /// Build the prioritized feed for every published post
    ///
    /// Read-only. Missed checkpoints come first, then positive signals,
    /// then upcoming reminders when enabled.
    pub async fn feed(&self) -> Result<Vec<Notification>, AppError> {
        let timer = NOTIFICATION_FEED_DURATION_SECONDS.start_timer();

        let posts = match self
            .db
            .get_posts_with_checkpoints(Some(PostStatus::Published))
            .await
        {
            Ok(posts) => posts,
            Err(error) => {
                record_error(&error);
                return Err(error);
            }
        };

        let feed = build_feed(&posts, self.clock.now(), &self.settings);
        timer.observe_duration();

        for notification in &feed {
            NOTIFICATIONS_GENERATED_TOTAL
                .with_label_values(&[notification.kind.as_str()])
                .inc();
        }

        tracing::debug!(
            posts = posts.len(),
            notifications = feed.len(),
            "Notification feed built"
        );

        Ok(feed)
    }
}
