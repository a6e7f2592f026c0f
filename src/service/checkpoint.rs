//! Checkpoint service
//!
//! Captures checkpoints and assembles a post's timeline view.

use serde::Serialize;
use std::sync::Arc;

use crate::clock::Clock;
use crate::data::{Checkpoint, CheckpointInput, Database, Post};
use crate::engine::{
    CheckpointKind, CheckpointMetrics, MetricDeltas, PostSchedule, Signal, TimelineEntry, classify,
    timeline_deltas,
};
use crate::error::AppError;
use crate::metrics::{CHECKPOINTS_CAPTURED_TOTAL, record_error};

/// One captured checkpoint with everything derived from it
#[derive(Debug, Clone, Serialize)]
pub struct TimelineRow {
    pub checkpoint: Checkpoint,
    pub metrics: CheckpointMetrics,
    pub signal: Signal,
    /// Change against the previous checkpoint, `None` for the first row
    pub deltas: Option<MetricDeltas>,
}

/// Timeline view of one post
#[derive(Debug, Clone, Serialize)]
pub struct PostTimeline {
    pub post: Post,
    /// One entry per catalog kind; empty until the post is published
    pub schedule: Vec<TimelineEntry>,
    pub missed_kinds: Vec<CheckpointKind>,
    pub next_suggested_kind: Option<CheckpointKind>,
    /// Captured checkpoints, oldest first
    pub rows: Vec<TimelineRow>,
}

/// Checkpoint service
pub struct CheckpointService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl CheckpointService {
    /// Create new checkpoint service
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Record a checkpoint for a post
    ///
    /// The capture time is the current clock instant.
    ///
    /// # Errors
    /// - `Validation` for negative counters or out-of-range rates
    /// - `NotFound` if the post does not exist
    /// - `Conflict` if this kind was already captured
    pub async fn capture(
        &self,
        post_id: &str,
        kind: CheckpointKind,
        input: CheckpointInput,
    ) -> Result<Checkpoint, AppError> {
        let result = self.try_capture(post_id, kind, input).await;
        if let Err(ref error) = result {
            record_error(error);
        }
        result
    }

    async fn try_capture(
        &self,
        post_id: &str,
        kind: CheckpointKind,
        input: CheckpointInput,
    ) -> Result<Checkpoint, AppError> {
        input.validate()?;

        if self.db.get_post(post_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let checkpoint = input.into_checkpoint(post_id.to_string(), kind, self.clock.now());
        self.db.insert_checkpoint(&checkpoint).await?;

        CHECKPOINTS_CAPTURED_TOTAL
            .with_label_values(&[kind.label()])
            .inc();
        tracing::info!(post_id = %post_id, kind = %kind, "Checkpoint captured");

        Ok(checkpoint)
    }

    /// Delete a checkpoint
    ///
    /// # Errors
    /// Returns `NotFound` if the checkpoint does not exist
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.db.delete_checkpoint(id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(checkpoint_id = %id, "Checkpoint deleted");
        Ok(())
    }

    /// Schedule of a published post at the current instant
    ///
    /// Returns `None` for posts that are not published.
    pub async fn schedule(&self, post_id: &str) -> Result<Option<PostSchedule>, AppError> {
        let post = self.db.get_post(post_id).await?.ok_or(AppError::NotFound)?;
        let Some(published_at) = post.published_at.filter(|_| post.is_published()) else {
            return Ok(None);
        };

        let checkpoints = self.db.get_checkpoints_for_post(post_id).await?;
        Ok(Some(PostSchedule::from_checkpoints(
            published_at,
            &checkpoints,
            self.clock.now(),
        )))
    }

    /// Build the timeline view of a post
    ///
    /// # Errors
    /// Returns `NotFound` if the post does not exist
    pub async fn timeline(&self, post_id: &str) -> Result<PostTimeline, AppError> {
        let post = self.db.get_post(post_id).await?.ok_or(AppError::NotFound)?;
        let checkpoints = self.db.get_checkpoints_for_post(post_id).await?;
        let now = self.clock.now();

        let schedule = post
            .published_at
            .filter(|_| post.is_published())
            .map(|published_at| PostSchedule::from_checkpoints(published_at, &checkpoints, now));

        let (entries, missed_kinds, next_suggested_kind) = match &schedule {
            Some(schedule) => (
                schedule.timeline(),
                schedule.missed_kinds(),
                schedule.next_suggested_kind(),
            ),
            None => (Vec::new(), Vec::new(), None),
        };

        let mut deltas = timeline_deltas(&checkpoints).into_iter();
        let rows = checkpoints
            .into_iter()
            .enumerate()
            .map(|(index, checkpoint)| {
                let metrics = CheckpointMetrics::derive(&checkpoint, post.duration_seconds);
                let signal = classify(&metrics.signal_inputs());
                let deltas = if index == 0 { None } else { deltas.next() };
                TimelineRow {
                    checkpoint,
                    metrics,
                    signal,
                    deltas,
                }
            })
            .collect();

        Ok(PostTimeline {
            post,
            schedule: entries,
            missed_kinds,
            next_suggested_kind,
            rows,
        })
    }
}
