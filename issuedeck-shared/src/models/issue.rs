/// Issue model and database operations
///
/// Issues live inside a project and carry a workflow status, a priority,
/// and a tag. The assignee is optional and, when set, must be a
/// contributor of the project (enforced by the access layer before the
/// write, see `auth::access::require_assignable`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE issue_status AS ENUM ('to_do', 'in_progress', 'done');
/// CREATE TYPE issue_priority AS ENUM ('low', 'medium', 'high');
/// CREATE TYPE issue_tag AS ENUM ('bug', 'feature', 'task');
///
/// CREATE TABLE issues (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status issue_status NOT NULL DEFAULT 'to_do',
///     priority issue_priority NOT NULL DEFAULT 'medium',
///     tag issue_tag NOT NULL DEFAULT 'task',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workflow status of an issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Not started yet (the default for new issues)
    #[default]
    ToDo,

    /// Being worked on
    InProgress,

    /// Completed
    Done,
}

impl IssueStatus {
    /// Converts the status to a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::ToDo => "to_do",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Done => "done",
        }
    }
}

/// Priority of an issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    /// Low priority
    Low,

    /// Medium priority (the default for new issues)
    #[default]
    Medium,

    /// High priority
    High,
}

impl IssuePriority {
    /// Converts the priority to a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuePriority::Low => "low",
            IssuePriority::Medium => "medium",
            IssuePriority::High => "high",
        }
    }
}

/// Kind of work an issue represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_tag", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    /// Defect
    Bug,

    /// New functionality
    Feature,

    /// General work item (the default for new issues)
    #[default]
    Task,
}

impl IssueTag {
    /// Converts the tag to a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueTag::Bug => "bug",
            IssueTag::Feature => "feature",
            IssueTag::Task => "task",
        }
    }
}

/// Issue model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    /// Unique issue ID (UUID v4)
    pub id: Uuid,

    /// Project the issue belongs to
    pub project_id: Uuid,

    /// The user who created and may mutate the issue
    pub author_id: Uuid,

    /// Optional assignee (must be a contributor of the project)
    pub assignee_id: Option<Uuid>,

    /// Issue title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Workflow status
    pub status: IssueStatus,

    /// Priority
    pub priority: IssuePriority,

    /// Kind of work
    pub tag: IssueTag,

    /// When the issue was created
    pub created_at: DateTime<Utc>,

    /// When the issue was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new issue
///
/// Status, priority, and tag fall back to their defaults when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssue {
    /// Issue title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Workflow status (defaults to to_do)
    #[serde(default)]
    pub status: IssueStatus,

    /// Priority (defaults to medium)
    #[serde(default)]
    pub priority: IssuePriority,

    /// Kind of work (defaults to task)
    #[serde(default)]
    pub tag: IssueTag,

    /// Optional assignee
    pub assignee_id: Option<Uuid>,
}

/// Input for updating an existing issue
///
/// All fields are optional. Only non-None fields will be updated.
/// `assignee_id` is doubly optional: `None` leaves the assignee alone,
/// `Some(None)` clears it, `Some(Some(id))` reassigns.
#[derive(Debug, Clone, Default)]
pub struct UpdateIssue {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New workflow status
    pub status: Option<IssueStatus>,

    /// New priority
    pub priority: Option<IssuePriority>,

    /// New tag
    pub tag: Option<IssueTag>,

    /// New assignee (outer None = unchanged, inner None = unassign)
    pub assignee_id: Option<Option<Uuid>>,
}

const ISSUE_COLUMNS: &str = "id, project_id, author_id, assignee_id, title, description, \
     status, priority, tag, created_at, updated_at";

impl Issue {
    /// Creates a new issue in a project
    ///
    /// Membership of the author and (if set) the assignee is the
    /// caller's responsibility, see the access predicates.
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        author_id: Uuid,
        data: CreateIssue,
    ) -> Result<Self, sqlx::Error> {
        let issue = sqlx::query_as::<_, Issue>(&format!(
            r#"
            INSERT INTO issues (project_id, author_id, assignee_id, title, description,
                                status, priority, tag)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(project_id)
        .bind(author_id)
        .bind(data.assignee_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.tag)
        .fetch_one(pool)
        .await?;

        Ok(issue)
    }

    /// Lists a project's issues, restricted to the given user's membership
    ///
    /// Non-members get an empty result indistinguishable from a project
    /// with no issues; callers check membership separately to turn that
    /// into a 404.
    pub async fn list_for_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let issues = sqlx::query_as::<_, Issue>(
            r#"
            SELECT i.id, i.project_id, i.author_id, i.assignee_id, i.title, i.description,
                   i.status, i.priority, i.tag, i.created_at, i.updated_at
            FROM issues i
            JOIN contributors c ON c.project_id = i.project_id AND c.user_id = $2
            WHERE i.project_id = $1
            ORDER BY i.created_at ASC
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(issues)
    }

    /// Finds an issue by ID within a project, restricted to the given
    /// user's membership
    ///
    /// The project ID comes from the request path; an issue ID that
    /// exists under a different project yields None.
    pub async fn find_for_member(
        pool: &PgPool,
        project_id: Uuid,
        issue_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            SELECT i.id, i.project_id, i.author_id, i.assignee_id, i.title, i.description,
                   i.status, i.priority, i.tag, i.created_at, i.updated_at
            FROM issues i
            JOIN contributors c ON c.project_id = i.project_id AND c.user_id = $3
            WHERE i.id = $2 AND i.project_id = $1
            "#,
        )
        .bind(project_id)
        .bind(issue_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(issue)
    }

    /// Updates an existing issue
    ///
    /// Only non-None fields in `data` will be updated. Authorization
    /// (author-only) and assignee membership are the caller's
    /// responsibility.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateIssue,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE issues SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.tag.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tag = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", ISSUE_COLUMNS));

        let mut q = sqlx::query_as::<_, Issue>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(tag) = data.tag {
            q = q.bind(tag);
        }
        if let Some(assignee_id) = data.assignee_id {
            // Binding Option<Uuid> writes NULL when clearing the assignee
            q = q.bind(assignee_id);
        }

        let issue = q.fetch_optional(pool).await?;

        Ok(issue)
    }

    /// Deletes an issue by ID
    ///
    /// Comments cascade. Authorization (author-only) is the caller's
    /// responsibility.
    ///
    /// # Returns
    ///
    /// True if the issue was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_enum_defaults() {
        assert_eq!(IssueStatus::default(), IssueStatus::ToDo);
        assert_eq!(IssuePriority::default(), IssuePriority::Medium);
        assert_eq!(IssueTag::default(), IssueTag::Task);
    }

    #[test]
    fn test_issue_enum_as_str() {
        assert_eq!(IssueStatus::InProgress.as_str(), "in_progress");
        assert_eq!(IssuePriority::High.as_str(), "high");
        assert_eq!(IssueTag::Feature.as_str(), "feature");
    }

    #[test]
    fn test_issue_enum_serde() {
        let json = serde_json::to_string(&IssueStatus::ToDo).unwrap();
        assert_eq!(json, "\"to_do\"");

        let parsed: IssuePriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, IssuePriority::Low);

        let parsed: IssueTag = serde_json::from_str("\"bug\"").unwrap();
        assert_eq!(parsed, IssueTag::Bug);
    }

    #[test]
    fn test_create_issue_defaults_from_json() {
        let body = r#"{"title": "Crash on save", "description": "Stack trace attached"}"#;
        let data: CreateIssue = serde_json::from_str(body).unwrap();

        assert_eq!(data.status, IssueStatus::ToDo);
        assert_eq!(data.priority, IssuePriority::Medium);
        assert_eq!(data.tag, IssueTag::Task);
        assert!(data.assignee_id.is_none());
    }

    #[test]
    fn test_update_issue_assignee_states() {
        let unchanged = UpdateIssue::default();
        assert!(unchanged.assignee_id.is_none());

        let cleared = UpdateIssue {
            assignee_id: Some(None),
            ..Default::default()
        };
        assert_eq!(cleared.assignee_id, Some(None));

        let id = Uuid::new_v4();
        let reassigned = UpdateIssue {
            assignee_id: Some(Some(id)),
            ..Default::default()
        };
        assert_eq!(reassigned.assignee_id, Some(Some(id)));
    }
}
