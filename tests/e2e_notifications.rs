//! Integration tests for the notification feed

mod common;

use chrono::Duration;
use common::{TestContext, neutral_input, positive_input};

use checkpointer::config::NotificationConfig;
use checkpointer::data::Post;
use checkpointer::engine::{
    CheckpointKind, MISSED_CHECKPOINT_PRIORITY, NotificationKind, POSITIVE_SIGNAL_PRIORITY,
    SuggestedAction, UPCOMING_PRIORITY,
};

/// Capture every kind already due, the last one with positive counters
async fn capture_all_due(ctx: &TestContext, post: &Post) {
    let published_at = post.published_at.unwrap();
    let due: Vec<_> = CheckpointKind::ALL
        .into_iter()
        .filter(|kind| kind.due_at(published_at) <= ctx.now)
        .collect();

    for (index, kind) in due.iter().enumerate() {
        let input = if index + 1 == due.len() {
            positive_input(1000 * (index as i64 + 1))
        } else {
            neutral_input(1000 * (index as i64 + 1))
        };
        ctx.insert_checkpoint(&post.id, *kind, input, kind.due_at(published_at))
            .await;
    }
}

#[tokio::test]
async fn test_missed_checkpoint_notification() {
    let ctx = TestContext::new().await;
    let post = ctx.create_post("Clip", Some(Duration::hours(3))).await;
    ctx.insert_checkpoint(
        &post.id,
        CheckpointKind::OneHour,
        neutral_input(100),
        ctx.now - Duration::hours(2),
    )
    .await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    assert_eq!(feed.len(), 1);

    let notification = &feed[0];
    assert_eq!(notification.kind, NotificationKind::MissedCheckpoint);
    assert_eq!(notification.id, format!("missed_checkpoint:{}:3h", post.id));
    assert_eq!(notification.priority, MISSED_CHECKPOINT_PRIORITY);
    assert_eq!(notification.timestamp, ctx.now);
    assert_eq!(
        notification.action,
        SuggestedAction::CaptureCheckpoint {
            post_id: post.id.clone(),
            kind: CheckpointKind::ThreeHours,
        }
    );
}

#[tokio::test]
async fn test_positive_signal_within_window() {
    let ctx = TestContext::new().await;
    let post = ctx.create_post("Clip", Some(Duration::days(7))).await;
    capture_all_due(&ctx, &post).await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, NotificationKind::PositiveSignal);
    assert_eq!(feed[0].priority, POSITIVE_SIGNAL_PRIORITY);
    // Exactly seven days after publishing, the latest capture is the 7d one
    assert_eq!(feed[0].timestamp, ctx.now);
}

#[tokio::test]
async fn test_positive_signal_outside_window_is_suppressed() {
    let ctx = TestContext::new().await;
    let post = ctx
        .create_post("Clip", Some(Duration::days(7) + Duration::minutes(1)))
        .await;
    capture_all_due(&ctx, &post).await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_single_checkpoint_never_signals() {
    let ctx = TestContext::new().await;
    let post = ctx.create_post("Clip", Some(Duration::minutes(90))).await;
    ctx.insert_checkpoint(
        &post.id,
        CheckpointKind::OneHour,
        positive_input(500),
        ctx.now - Duration::minutes(30),
    )
    .await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_feed_order_and_unpublished_posts() {
    let ctx = TestContext::new().await;

    let positive = ctx.create_post("Hit", Some(Duration::days(2))).await;
    capture_all_due(&ctx, &positive).await;

    let missing = ctx.create_post("Late", Some(Duration::hours(1))).await;
    ctx.create_post("Draft", None).await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    let summary: Vec<_> = feed
        .iter()
        .map(|n| (n.kind, n.post_id.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (NotificationKind::MissedCheckpoint, missing.id.as_str()),
            (NotificationKind::PositiveSignal, positive.id.as_str()),
        ]
    );
}

#[tokio::test]
async fn test_upcoming_notifications_when_enabled() {
    let disabled = TestContext::new().await;
    disabled
        .create_post("Fresh", Some(Duration::minutes(30)))
        .await;
    assert!(disabled.state.notifications().feed().await.unwrap().is_empty());

    let ctx = TestContext::with_notifications(NotificationConfig {
        upcoming_lead_minutes: Some(60),
        ..NotificationConfig::default()
    })
    .await;
    let post = ctx.create_post("Fresh", Some(Duration::minutes(30))).await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, NotificationKind::Upcoming);
    assert_eq!(feed[0].id, format!("upcoming:{}:1h", post.id));
    assert_eq!(feed[0].priority, UPCOMING_PRIORITY);
    assert_eq!(feed[0].timestamp, ctx.now + Duration::minutes(30));
}

#[tokio::test]
async fn test_max_items_truncates_feed() {
    let ctx = TestContext::with_notifications(NotificationConfig {
        max_items: Some(2),
        ..NotificationConfig::default()
    })
    .await;
    ctx.create_post("Neglected", Some(Duration::days(1))).await;

    let feed = ctx.state.notifications().feed().await.unwrap();
    assert_eq!(feed.len(), 2);
    assert!(
        feed.iter()
            .all(|n| n.kind == NotificationKind::MissedCheckpoint)
    );
}
