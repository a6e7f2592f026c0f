//! Tag service
//!
//! Tag lookup, post tagging and tag merges.

use std::sync::Arc;

use crate::data::{Database, Tag};
use crate::engine::{TagMergeOutcome, normalize_tag_name, validate_merge_request};
use crate::error::AppError;
use crate::metrics::{TAG_MERGES_TOTAL, record_error};

/// Tag service
pub struct TagService {
    db: Arc<Database>,
}

fn normalized(raw: &str) -> Result<String, AppError> {
    let name = normalize_tag_name(raw);
    if name.is_empty() {
        return Err(AppError::Validation("tag names must not be empty".to_string()));
    }
    Ok(name)
}

impl TagService {
    /// Create new tag service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Find a tag by name, creating it on first use
    pub async fn find_or_create(&self, name: &str) -> Result<Tag, AppError> {
        let name = normalized(name)?;
        self.db.find_or_create_tag(&name).await
    }

    /// Replace a post's tags
    ///
    /// Names are normalized; repeats collapse onto their first position.
    pub async fn set_post_tags(
        &self,
        post_id: &str,
        names: &[&str],
    ) -> Result<Vec<Tag>, AppError> {
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for raw in names {
            let name = normalized(raw)?;
            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        let tags = self.db.set_post_tags(post_id, &unique).await?;
        tracing::debug!(post_id = %post_id, count = tags.len(), "Post tags replaced");
        Ok(tags)
    }

    /// Tags of a post in display order
    pub async fn tags_for_post(&self, post_id: &str) -> Result<Vec<Tag>, AppError> {
        self.db.get_tags_for_post(post_id).await
    }

    /// IDs of every post carrying a tag
    ///
    /// # Errors
    /// Returns `NotFound` if the tag does not exist
    pub async fn posts_for_tag(&self, name: &str) -> Result<Vec<String>, AppError> {
        let name = normalized(name)?;
        let tag = self
            .db
            .get_tag_by_name(&name)
            .await?
            .ok_or(AppError::NotFound)?;

        let links = self.db.get_tag_associations(&tag.id).await?;
        Ok(links.into_iter().map(|link| link.post_id).collect())
    }

    /// Merge `source` into `target`
    ///
    /// Every post tagged `source` ends up tagged `target` exactly once and
    /// `source` is deleted. The whole merge is atomic.
    ///
    /// # Errors
    /// - `Validation` for empty or identical names
    /// - `TagNotFound` naming the missing side
    /// - `Conflict` or `Database` if the transaction fails; nothing is changed
    pub async fn merge(&self, source: &str, target: &str) -> Result<TagMergeOutcome, AppError> {
        let result = match validate_merge_request(source, target) {
            Ok((source, target)) => self.db.merge_tags(&source, &target).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(outcome) => {
                TAG_MERGES_TOTAL.with_label_values(&["success"]).inc();
                tracing::info!(
                    source = %source,
                    target = %outcome.target.name,
                    repointed = outcome.repointed,
                    dropped = outcome.dropped,
                    "Tags merged"
                );
            }
            Err(error) => {
                TAG_MERGES_TOTAL.with_label_values(&["failure"]).inc();
                record_error(error);
                tracing::warn!(
                    source = %source,
                    target = %target,
                    error = %error,
                    "Tag merge failed"
                );
            }
        }

        result
    }
}
