/// Project model and database operations
///
/// Projects are owned by an author and visible to their contributor set.
/// Creation is transactional: the project row and the author's
/// contributor row are inserted in one transaction, so the "author is
/// implicitly a contributor" invariant holds from the first instant.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_type AS ENUM ('backend', 'frontend', 'ios', 'android');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     project_type project_type NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use issuedeck_shared::models::project::{CreateProject, Project, ProjectType};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, author_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, author_id, CreateProject {
///     title: "Mobile app".to_string(),
///     description: "iOS companion app".to_string(),
///     project_type: ProjectType::Ios,
/// }).await?;
///
/// // The author sees it immediately
/// let visible = Project::find_for_member(&pool, project.id, author_id).await?;
/// assert!(visible.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Backend service
    Backend,

    /// Frontend application
    Frontend,

    /// iOS application
    Ios,

    /// Android application
    Android,
}

impl ProjectType {
    /// Converts the type to a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Backend => "backend",
            ProjectType::Frontend => "frontend",
            ProjectType::Ios => "ios",
            ProjectType::Android => "android",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Project category
    pub project_type: ProjectType,

    /// The user who owns and can mutate the project
    pub author_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Project category
    pub project_type: ProjectType,
}

/// Input for updating an existing project
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New category
    pub project_type: Option<ProjectType>,
}

impl Project {
    /// Creates a new project with its author as the first contributor
    ///
    /// Both inserts run in one transaction: if the contributor insert
    /// fails, the project insert is rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the author doesn't exist (foreign key
    /// violation) or the database is unreachable.
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, project_type, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, project_type, author_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_type)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO contributors (project_id, user_id) VALUES ($1, $2)")
            .bind(project.id)
            .bind(author_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(project)
    }

    /// Lists the projects the given user contributes to
    ///
    /// This is the membership-scoped list query: projects the user is
    /// not a contributor of are simply absent.
    pub async fn list_for_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.title, p.description, p.project_type, p.author_id,
                   p.created_at, p.updated_at
            FROM projects p
            JOIN contributors c ON c.project_id = p.id
            WHERE c.user_id = $1
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Finds a project by ID, restricted to the given user's membership
    ///
    /// Returns None both for nonexistent projects and for projects the
    /// user is not a contributor of, so callers cannot distinguish the
    /// two cases.
    pub async fn find_for_member(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.title, p.description, p.project_type, p.author_id,
                   p.created_at, p.updated_at
            FROM projects p
            JOIN contributors c ON c.project_id = p.id
            WHERE p.id = $1 AND c.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Updates an existing project
    ///
    /// Only non-None fields in `data` will be updated. Authorization
    /// (author-only) is the caller's responsibility.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.project_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_type = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, project_type, author_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(project_type) = data.project_type {
            q = q.bind(project_type);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project by ID
    ///
    /// Contributor rows, issues, and comments cascade. Authorization
    /// (author-only) is the caller's responsibility.
    ///
    /// # Returns
    ///
    /// True if the project was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
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
    fn test_project_type_as_str() {
        assert_eq!(ProjectType::Backend.as_str(), "backend");
        assert_eq!(ProjectType::Frontend.as_str(), "frontend");
        assert_eq!(ProjectType::Ios.as_str(), "ios");
        assert_eq!(ProjectType::Android.as_str(), "android");
    }

    #[test]
    fn test_project_type_serde() {
        let json = serde_json::to_string(&ProjectType::Android).unwrap();
        assert_eq!(json, "\"android\"");

        let parsed: ProjectType = serde_json::from_str("\"backend\"").unwrap();
        assert_eq!(parsed, ProjectType::Backend);
    }

    #[test]
    fn test_update_project_default() {
        let update = UpdateProject::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.project_type.is_none());
    }
}
