/// Access-control predicates
///
/// This module is the single place the author/contributor rules live.
/// Every predicate takes the actor identity as an explicit parameter and
/// returns a tagged error on denial, so callers can map each denial to
/// the right HTTP status.
///
/// # Permission Model
///
/// 1. **Membership scoping**: every read, and the scoped fetch that
///    precedes every write, is intersected with the actor's contributor
///    rows in SQL (see the scoped queries on the models). Non-members
///    therefore see a uniform "not found" and never reach these
///    predicates.
/// 2. **Author-only writes**: mutating a project, issue, or comment
///    requires the actor to be its author; other contributors are
///    read-only.
/// 3. **Membership management**: only the project author may create or
///    delete contributor rows.
/// 4. **Assignment**: an issue assignee must be a contributor of the
///    issue's project; violations are input errors, not permission
///    errors.
///
/// # Example
///
/// ```
/// use issuedeck_shared::auth::access::require_author;
/// use uuid::Uuid;
///
/// let author = Uuid::new_v4();
///
/// // The author may mutate their own resource, nobody else may
/// assert!(require_author(author, author).is_ok());
/// assert!(require_author(Uuid::new_v4(), author).is_err());
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::contributor::Contributor;

/// Error type for access-control checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Actor is not the author of the resource
    #[error("Only the author may modify this resource")]
    NotAuthor,

    /// Actor is not the author of the project owning the contributor set
    #[error("Only the project author may manage contributors of project {0}")]
    NotProjectAuthor(Uuid),

    /// Proposed assignee is not a contributor of the issue's project
    #[error("Assignee {assignee_id} is not a contributor of project {project_id}")]
    AssigneeNotContributor {
        assignee_id: Uuid,
        project_id: Uuid,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Requires that the actor is the author of a resource
///
/// Applies to writes and deletes on projects, issues, and comments:
/// contributors without authorship get read-only access.
pub fn require_author(actor_id: Uuid, author_id: Uuid) -> Result<(), AccessError> {
    if actor_id != author_id {
        return Err(AccessError::NotAuthor);
    }

    Ok(())
}

/// Requires that the actor is the author of the project
///
/// Applies to any mutation of the project's contributor rows;
/// contributors have no self-service membership change.
pub fn require_project_author(
    actor_id: Uuid,
    project_author_id: Uuid,
    project_id: Uuid,
) -> Result<(), AccessError> {
    if actor_id != project_author_id {
        return Err(AccessError::NotProjectAuthor(project_id));
    }

    Ok(())
}

/// Requires that a proposed assignee is a contributor of the project
///
/// Evaluated synchronously before persisting an issue create or update
/// that supplies an assignee.
pub async fn require_assignable(
    pool: &PgPool,
    project_id: Uuid,
    assignee_id: Uuid,
) -> Result<(), AccessError> {
    if !Contributor::exists(pool, project_id, assignee_id).await? {
        return Err(AccessError::AssigneeNotContributor {
            assignee_id,
            project_id,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_author() {
        let author = Uuid::new_v4();

        assert!(require_author(author, author).is_ok());

        let result = require_author(Uuid::new_v4(), author);
        assert!(matches!(result, Err(AccessError::NotAuthor)));
    }

    #[test]
    fn test_require_project_author() {
        let author = Uuid::new_v4();
        let project_id = Uuid::new_v4();

        assert!(require_project_author(author, author, project_id).is_ok());

        let result = require_project_author(Uuid::new_v4(), author, project_id);
        match result {
            Err(AccessError::NotProjectAuthor(id)) => assert_eq!(id, project_id),
            other => panic!("Expected NotProjectAuthor, got {:?}", other),
        }
    }

    #[test]
    fn test_access_error_display() {
        let err = AccessError::NotAuthor;
        assert!(err.to_string().contains("author"));

        let err = AccessError::AssigneeNotContributor {
            assignee_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
        };
        assert!(err.to_string().contains("not a contributor of project"));
    }
}
