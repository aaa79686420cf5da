/// Database models for issuedeck
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with consent/compliance flags
/// - `project`: Projects owned by an author
/// - `contributor`: User-project membership (the join table)
/// - `issue`: Issues scoped to a project
/// - `comment`: Comments scoped to an issue
///
/// All list/detail queries on projects, issues, and comments are
/// membership-scoped: they join against the contributors table for the
/// requesting user, so rows outside the actor's projects are simply
/// absent from results.
///
/// # Example
///
/// ```no_run
/// use issuedeck_shared::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let projects = Project::list_for_member(&pool, user_id).await?;
/// println!("{} visible projects", projects.len());
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod contributor;
pub mod issue;
pub mod project;
pub mod user;
