/// Comment endpoints
///
/// Comments are nested under an issue. Reads are membership-scoped
/// through the issue's project; writes require comment authorship.
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/issues/:issue_id/comments` - List comments
/// - `POST /v1/projects/:project_id/issues/:issue_id/comments` - Create a comment
/// - `GET /v1/projects/:project_id/issues/:issue_id/comments/:comment_id` - Get one comment
/// - `PUT /v1/projects/:project_id/issues/:issue_id/comments/:comment_id` - Update (author only)
/// - `DELETE /v1/projects/:project_id/issues/:issue_id/comments/:comment_id` - Delete (author only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use issuedeck_shared::{
    auth::{access, context::AuthContext},
    models::{comment::Comment, issue::Issue},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment body
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Update comment request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    /// New comment body
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Verifies the project/issue path against the caller's membership
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

/// Fetches a comment within the caller's membership scope, or 404
async fn find_scoped_comment(
    state: &AppState,
    auth: AuthContext,
    project_id: Uuid,
    issue_id: Uuid,
    comment_id: Uuid,
) -> ApiResult<Comment> {
    Comment::find_for_member(&state.db, project_id, issue_id, comment_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// List an issue's comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Comment>>> {
    find_scoped_issue(&state, auth, project_id, issue_id).await?;

    let comments = Comment::list_for_member(&state.db, project_id, issue_id, auth.user_id).await?;

    Ok(Json(comments))
}

/// Create a comment on an issue
///
/// Any contributor of the project may comment; the caller becomes the
/// author.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    find_scoped_issue(&state, auth, project_id, issue_id).await?;

    req.validate()?;

    let comment = Comment::create(&state.db, issue_id, auth.user_id, req.content).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Get one comment
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<Comment>> {
    let comment = find_scoped_comment(&state, auth, project_id, issue_id, comment_id).await?;

    Ok(Json(comment))
}

/// Update a comment (author only)
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a contributor but not the comment author
/// - `404 Not Found`: Out of scope or nonexistent
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let comment = find_scoped_comment(&state, auth, project_id, issue_id, comment_id).await?;
    access::require_author(auth.user_id, comment.author_id)?;

    req.validate()?;

    let updated = Comment::update(&state.db, comment_id, req.content)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a comment (author only)
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let comment = find_scoped_comment(&state, auth, project_id, issue_id, comment_id).await?;
    access::require_author(auth.user_id, comment.author_id)?;

    Comment::delete(&state.db, comment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
