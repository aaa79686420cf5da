/// Comment model and database operations
///
/// Comments hang off an issue. Visibility follows the issue's project:
/// the scoped queries join through issues to contributors, so the path
/// scoping (project, then issue, then comment) is enforced in SQL.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     issue_id UUID NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID (UUID v4)
    pub id: Uuid,

    /// Issue the comment belongs to
    pub issue_id: Uuid,

    /// The user who wrote and may mutate the comment
    pub author_id: Uuid,

    /// Comment body
    pub content: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment on an issue
    ///
    /// Membership of the author is the caller's responsibility, see the
    /// access predicates.
    pub async fn create(
        pool: &PgPool,
        issue_id: Uuid,
        author_id: Uuid,
        content: String,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (issue_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, issue_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(issue_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Lists an issue's comments, restricted to the given user's membership
    ///
    /// The project ID comes from the request path; comments whose issue
    /// belongs to a different project are excluded, so a mismatched path
    /// yields an empty list.
    pub async fn list_for_member(
        pool: &PgPool,
        project_id: Uuid,
        issue_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.issue_id, c.author_id, c.content, c.created_at, c.updated_at
            FROM comments c
            JOIN issues i ON i.id = c.issue_id AND i.project_id = $1
            JOIN contributors ct ON ct.project_id = i.project_id AND ct.user_id = $3
            WHERE c.issue_id = $2
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(project_id)
        .bind(issue_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Finds a comment by ID within a project/issue pair, restricted to
    /// the given user's membership
    pub async fn find_for_member(
        pool: &PgPool,
        project_id: Uuid,
        issue_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.issue_id, c.author_id, c.content, c.created_at, c.updated_at
            FROM comments c
            JOIN issues i ON i.id = c.issue_id AND i.project_id = $1
            JOIN contributors ct ON ct.project_id = i.project_id AND ct.user_id = $4
            WHERE c.id = $3 AND c.issue_id = $2
            "#,
        )
        .bind(project_id)
        .bind(issue_id)
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Updates a comment's content
    ///
    /// Authorization (author-only) is the caller's responsibility.
    ///
    /// # Returns
    ///
    /// The updated comment if found, None if the comment doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        content: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, issue_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment by ID
    ///
    /// Authorization (author-only) is the caller's responsibility.
    ///
    /// # Returns
    ///
    /// True if the comment was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
