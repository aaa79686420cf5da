/// Issue endpoints
///
/// Issues are nested under a project. Reads are membership-scoped,
/// writes require issue authorship, and any assignee must be a
/// contributor of the project.
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/issues` - List a project's issues
/// - `POST /v1/projects/:project_id/issues` - Create an issue
/// - `GET /v1/projects/:project_id/issues/:issue_id` - Get one issue
/// - `PUT /v1/projects/:project_id/issues/:issue_id` - Update (author only)
/// - `DELETE /v1/projects/:project_id/issues/:issue_id` - Delete (author only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::find_scoped_project,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use issuedeck_shared::{
    auth::{access, context::AuthContext},
    models::issue::{
        CreateIssue, Issue, IssuePriority, IssueStatus, IssueTag, UpdateIssue,
    },
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

/// Create issue request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIssueRequest {
    /// Issue title
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
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

    /// Optional assignee (must be a contributor of the project)
    pub assignee_id: Option<Uuid>,
}

/// Update issue request
///
/// Omitting `assignee_id` leaves the assignee unchanged; sending an
/// explicit `null` clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIssueRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New workflow status
    pub status: Option<IssueStatus>,

    /// New priority
    pub priority: Option<IssuePriority>,

    /// New tag
    pub tag: Option<IssueTag>,

    /// New assignee (absent = unchanged, null = unassign)
    #[serde(default, deserialize_with = "present_or_null")]
    pub assignee_id: Option<Option<Uuid>>,
}

/// Distinguishes an absent field from an explicit null
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Fetches an issue within the caller's membership scope, or 404
async fn find_scoped_issue(
    state: &AppState,
    auth: AuthContext,
    project_id: Uuid,
    issue_id: Uuid,
) -> ApiResult<Issue> {
    Issue::find_for_member(&state.db, project_id, issue_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Issue not found".to_string()))
}

/// List a project's issues
pub async fn list_issues(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Issue>>> {
    find_scoped_project(&state, auth, project_id).await?;

    let issues = Issue::list_for_member(&state.db, project_id, auth.user_id).await?;

    Ok(Json(issues))
}

/// Create an issue in a project
///
/// Any contributor may create issues; the caller becomes the author.
///
/// # Errors
///
/// - `404 Not Found`: Project out of scope or nonexistent
/// - `422 Unprocessable Entity`: Validation failed, or the assignee is
///   not a contributor of the project
pub async fn create_issue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateIssueRequest>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    find_scoped_project(&state, auth, project_id).await?;

    req.validate()?;

    if let Some(assignee_id) = req.assignee_id {
        access::require_assignable(&state.db, project_id, assignee_id).await?;
    }

    let issue = Issue::create(
        &state.db,
        project_id,
        auth.user_id,
        CreateIssue {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            tag: req.tag,
            assignee_id: req.assignee_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(issue)))
}

/// Get one issue
pub async fn get_issue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Issue>> {
    let issue = find_scoped_issue(&state, auth, project_id, issue_id).await?;

    Ok(Json(issue))
}

/// Update an issue (author only)
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a contributor but not the issue author
/// - `404 Not Found`: Out of scope or nonexistent
/// - `422 Unprocessable Entity`: Validation failed, or the new assignee
///   is not a contributor of the project
pub async fn update_issue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateIssueRequest>,
) -> ApiResult<Json<Issue>> {
    let issue = find_scoped_issue(&state, auth, project_id, issue_id).await?;
    access::require_author(auth.user_id, issue.author_id)?;

    req.validate()?;

    if let Some(Some(assignee_id)) = req.assignee_id {
        access::require_assignable(&state.db, project_id, assignee_id).await?;
    }

    let updated = Issue::update(
        &state.db,
        issue_id,
        UpdateIssue {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            tag: req.tag,
            assignee_id: req.assignee_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Issue not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete an issue (author only)
///
/// Comments are removed with it.
pub async fn delete_issue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let issue = find_scoped_issue(&state, auth, project_id, issue_id).await?;
    access::require_author(auth.user_id, issue.author_id)?;

    Issue::delete(&state.db, issue_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_assignee_absent() {
        let req: UpdateIssueRequest = serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap();
        assert!(req.assignee_id.is_none());
    }

    #[test]
    fn test_update_request_assignee_null_clears() {
        let req: UpdateIssueRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(req.assignee_id, Some(None));
    }

    #[test]
    fn test_update_request_assignee_set() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"assignee_id": "{}"}}"#, id);
        let req: UpdateIssueRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.assignee_id, Some(Some(id)));
    }
}
