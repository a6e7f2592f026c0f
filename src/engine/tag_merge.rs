//! Tag merge planning
//!
//! A merge folds every association of a source tag into a target tag. The
//! plan is computed up front from a consistent snapshot of both tags'
//! associations and then applied as one transaction by the data layer.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::data::{PostTag, Tag};
use crate::error::AppError;

/// Which side of a merge request a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeSide {
    Source,
    Target,
}

impl fmt::Display for MergeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Normalized form of a tag label: trimmed and lowercased
pub fn normalize_tag_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize both sides of a merge request and reject unusable input
pub fn validate_merge_request(source: &str, target: &str) -> Result<(String, String), AppError> {
    let source = normalize_tag_name(source);
    let target = normalize_tag_name(target);

    if source.is_empty() || target.is_empty() {
        return Err(AppError::Validation("tag names must not be empty".to_string()));
    }

    if source == target {
        return Err(AppError::Validation(format!(
            "cannot merge tag \"{source}\" into itself"
        )));
    }

    Ok((source, target))
}

/// One write in a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStep {
    /// Move the post's source association onto the target, keeping its position
    Repoint { post_id: String },
    /// The post already carries the target; drop the source association
    Drop { post_id: String },
}

/// Every write needed to fold `source` into `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMergePlan {
    pub source_id: String,
    pub target_id: String,
    pub steps: Vec<MergeStep>,
}

impl TagMergePlan {
    pub fn repointed(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, MergeStep::Repoint { .. }))
            .count()
    }

    pub fn dropped(&self) -> usize {
        self.steps.len() - self.repointed()
    }
}

/// Plan a merge from the source tag's associations and the set of posts
/// already tagged with the target.
pub fn plan_tag_merge(
    source: &Tag,
    target: &Tag,
    source_links: &[PostTag],
    target_post_ids: &HashSet<String>,
) -> TagMergePlan {
    let steps = source_links
        .iter()
        .filter(|link| link.tag_id == source.id)
        .map(|link| {
            let post_id = link.post_id.clone();
            if target_post_ids.contains(&link.post_id) {
                MergeStep::Drop { post_id }
            } else {
                MergeStep::Repoint { post_id }
            }
        })
        .collect();

    TagMergePlan {
        source_id: source.id.clone(),
        target_id: target.id.clone(),
        steps,
    }
}

/// Result of a completed merge
#[derive(Debug, Clone, Serialize)]
pub struct TagMergeOutcome {
    /// The surviving tag
    pub target: Tag,
    pub repointed: usize,
    pub dropped: usize,
}
