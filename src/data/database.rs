//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with embedded migrations.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use super::models::*;
use crate::engine::{MergeSide, MergeStep, TagMergeOutcome, TagMergePlan, plan_tag_merge};
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Insert a tag unless its name already exists, then return the stored row.
async fn upsert_tag(conn: &mut SqliteConnection, name: &str) -> Result<Tag, AppError> {
    sqlx::query(
        "INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING",
    )
    .bind(EntityId::new().0)
    .bind(name)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(tag)
}

async fn find_tag(conn: &mut SqliteConnection, name: &str) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(tag)
}

fn sort_by_capture_time(checkpoints: &mut [Checkpoint]) {
    checkpoints.sort_by(|a, b| {
        a.captured_at
            .cmp(&b.captured_at)
            .then_with(|| a.checkpoint_kind().cmp(&b.checkpoint_kind()))
    });
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(super) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Insert a new post
    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, status, published_at, duration_seconds, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.status)
        .bind(post.published_at)
        .bind(post.duration_seconds)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get post by ID
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// Mark a post as published at the given instant
    ///
    /// Returns `false` if the post does not exist.
    pub async fn publish_post(
        &self,
        id: &str,
        published_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE posts SET status = ?, published_at = ? WHERE id = ?")
            .bind(PostStatus::Published.as_str())
            .bind(published_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Get posts with their checkpoints
    ///
    /// # Arguments
    /// * `status` - Only return posts in this lifecycle state
    ///
    /// # Returns
    /// Posts in creation order, each with checkpoints ordered by capture time
    pub async fn get_posts_with_checkpoints(
        &self,
        status: Option<PostStatus>,
    ) -> Result<Vec<PostWithCheckpoints>, AppError> {
        let started = Instant::now();

        let (posts, checkpoints) = if let Some(status) = status {
            let posts = sqlx::query_as::<_, Post>(
                "SELECT * FROM posts WHERE status = ? ORDER BY created_at ASC, id ASC",
            )
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

            let checkpoints = sqlx::query_as::<_, Checkpoint>(
                r#"
                SELECT c.* FROM checkpoints c
                INNER JOIN posts p ON p.id = c.post_id
                WHERE p.status = ?
                "#,
            )
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

            (posts, checkpoints)
        } else {
            let posts =
                sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at ASC, id ASC")
                    .fetch_all(&self.pool)
                    .await?;

            let checkpoints = sqlx::query_as::<_, Checkpoint>("SELECT * FROM checkpoints")
                .fetch_all(&self.pool)
                .await?;

            (posts, checkpoints)
        };

        let mut by_post: HashMap<String, Vec<Checkpoint>> = HashMap::new();
        for checkpoint in checkpoints {
            by_post
                .entry(checkpoint.post_id.clone())
                .or_default()
                .push(checkpoint);
        }

        let entries: Vec<PostWithCheckpoints> = posts
            .into_iter()
            .map(|post| {
                let mut checkpoints = by_post.remove(&post.id).unwrap_or_default();
                sort_by_capture_time(&mut checkpoints);
                PostWithCheckpoints { post, checkpoints }
            })
            .collect();

        tracing::debug!(
            posts = entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded posts with checkpoints"
        );

        Ok(entries)
    }

    // =========================================================================
    // Checkpoints
    // =========================================================================

    /// Insert a checkpoint
    ///
    /// # Errors
    /// Returns `Conflict` if the post already has a checkpoint of this kind
    pub async fn insert_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO checkpoints (
                id, post_id, kind, captured_at, views, likes, comments, shares, favorites,
                new_followers, profile_views, reach, total_play_time_seconds,
                average_watch_time_seconds, completion_rate
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(post_id, kind) DO NOTHING
            "#,
        )
        .bind(&checkpoint.id)
        .bind(&checkpoint.post_id)
        .bind(&checkpoint.kind)
        .bind(checkpoint.captured_at)
        .bind(checkpoint.views)
        .bind(checkpoint.likes)
        .bind(checkpoint.comments)
        .bind(checkpoint.shares)
        .bind(checkpoint.favorites)
        .bind(checkpoint.new_followers)
        .bind(checkpoint.profile_views)
        .bind(checkpoint.reach)
        .bind(checkpoint.total_play_time_seconds)
        .bind(checkpoint.average_watch_time_seconds)
        .bind(checkpoint.completion_rate)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "post {} already has a {} checkpoint",
                checkpoint.post_id, checkpoint.kind
            )));
        }

        Ok(())
    }

    /// Get checkpoint by ID
    pub async fn get_checkpoint(&self, id: &str) -> Result<Option<Checkpoint>, AppError> {
        let checkpoint = sqlx::query_as::<_, Checkpoint>("SELECT * FROM checkpoints WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(checkpoint)
    }

    /// Get a post's checkpoints ordered by capture time
    pub async fn get_checkpoints_for_post(
        &self,
        post_id: &str,
    ) -> Result<Vec<Checkpoint>, AppError> {
        let mut checkpoints =
            sqlx::query_as::<_, Checkpoint>("SELECT * FROM checkpoints WHERE post_id = ?")
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?;

        sort_by_capture_time(&mut checkpoints);
        Ok(checkpoints)
    }

    /// Delete checkpoint by ID
    ///
    /// Returns `false` if nothing was deleted.
    pub async fn delete_checkpoint(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM checkpoints WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Find a tag by normalized name, creating it if absent
    pub async fn find_or_create_tag(&self, name: &str) -> Result<Tag, AppError> {
        let mut conn = self.pool.acquire().await?;
        upsert_tag(&mut conn, name).await
    }

    /// Get tag by normalized name
    pub async fn get_tag_by_name(&self, name: &str) -> Result<Option<Tag>, AppError> {
        let mut conn = self.pool.acquire().await?;
        find_tag(&mut conn, name).await
    }

    /// Get a post's tags in display order
    pub async fn get_tags_for_post(&self, post_id: &str) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY pt.position ASC, t.name ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Get every association of a tag
    pub async fn get_tag_associations(&self, tag_id: &str) -> Result<Vec<PostTag>, AppError> {
        let links = sqlx::query_as::<_, PostTag>(
            "SELECT post_id, tag_id, position FROM post_tags WHERE tag_id = ? ORDER BY post_id ASC",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Replace a post's tags
    ///
    /// Tags are created on first use. Positions follow the order of `names`.
    /// Runs in a single transaction.
    ///
    /// # Arguments
    /// * `names` - Normalized, de-duplicated tag names
    pub async fn set_post_tags(
        &self,
        post_id: &str,
        names: &[String],
    ) -> Result<Vec<Tag>, AppError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Err(AppError::NotFound);
        }

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let mut tags = Vec::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            let tag = upsert_tag(&mut tx, name).await?;

            sqlx::query("INSERT INTO post_tags (post_id, tag_id, position) VALUES (?, ?, ?)")
                .bind(post_id)
                .bind(&tag.id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;

            tags.push(tag);
        }

        tx.commit().await?;

        Ok(tags)
    }

    /// Merge the `source` tag into the `target` tag
    ///
    /// Both names must already be normalized and distinct. Every step runs
    /// inside one transaction: the tags and their associations are read,
    /// the merge is planned, each association is repointed or dropped, and
    /// the source tag is deleted. Any failure rolls everything back.
    ///
    /// # Errors
    /// - `TagNotFound` naming the side that does not exist
    /// - `Conflict` if an association changed underneath the merge
    pub async fn merge_tags(
        &self,
        source: &str,
        target: &str,
    ) -> Result<TagMergeOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let source_tag = find_tag(&mut tx, source)
            .await?
            .ok_or_else(|| AppError::TagNotFound {
                side: MergeSide::Source,
                name: source.to_string(),
            })?;
        let target_tag = find_tag(&mut tx, target)
            .await?
            .ok_or_else(|| AppError::TagNotFound {
                side: MergeSide::Target,
                name: target.to_string(),
            })?;

        let source_links = sqlx::query_as::<_, PostTag>(
            "SELECT post_id, tag_id, position FROM post_tags WHERE tag_id = ? ORDER BY post_id ASC",
        )
        .bind(&source_tag.id)
        .fetch_all(&mut *tx)
        .await?;

        let target_post_ids: HashSet<String> =
            sqlx::query_scalar::<_, String>("SELECT post_id FROM post_tags WHERE tag_id = ?")
                .bind(&target_tag.id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        let plan: TagMergePlan =
            plan_tag_merge(&source_tag, &target_tag, &source_links, &target_post_ids);

        for step in &plan.steps {
            let (result, post_id) = match step {
                MergeStep::Repoint { post_id } => {
                    let result = sqlx::query(
                        "UPDATE post_tags SET tag_id = ? WHERE post_id = ? AND tag_id = ?",
                    )
                    .bind(&plan.target_id)
                    .bind(post_id)
                    .bind(&plan.source_id)
                    .execute(&mut *tx)
                    .await?;
                    (result, post_id)
                }
                MergeStep::Drop { post_id } => {
                    let result =
                        sqlx::query("DELETE FROM post_tags WHERE post_id = ? AND tag_id = ?")
                            .bind(post_id)
                            .bind(&plan.source_id)
                            .execute(&mut *tx)
                            .await?;
                    (result, post_id)
                }
            };

            if result.rows_affected() != 1 {
                return Err(AppError::Conflict(format!(
                    "association of post {post_id} with tag \"{source}\" changed during merge"
                )));
            }
        }

        let deleted = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(&plan.source_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() != 1 {
            return Err(AppError::Conflict(format!(
                "tag \"{source}\" was removed during merge"
            )));
        }

        tx.commit().await?;

        Ok(TagMergeOutcome {
            repointed: plan.repointed(),
            dropped: plan.dropped(),
            target: target_tag,
        })
    }
}
