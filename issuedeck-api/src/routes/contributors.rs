/// Contributor management endpoints
///
/// Contributor rows grant project visibility. Any contributor may list
/// them; only the project author may add or remove members. The author's
/// own membership cannot be removed.
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/contributors` - List members
/// - `POST /v1/projects/:project_id/contributors` - Add member (author only)
/// - `DELETE /v1/projects/:project_id/contributors/:user_id` - Remove member (author only)

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
    models::{contributor::Contributor, user::User},
};
use serde::Deserialize;
use uuid::Uuid;

/// Add contributor request
#[derive(Debug, Deserialize)]
pub struct AddContributorRequest {
    /// User to add to the project
    pub user_id: Uuid,
}

/// List a project's contributors
pub async fn list_contributors(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Contributor>>> {
    find_scoped_project(&state, auth, project_id).await?;

    let contributors = Contributor::list_by_project(&state.db, project_id).await?;

    Ok(Json(contributors))
}

/// Add a contributor to a project (project author only)
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a contributor but not the project author
/// - `404 Not Found`: Project out of scope, or target user doesn't exist
/// - `409 Conflict`: User is already a contributor
pub async fn add_contributor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddContributorRequest>,
) -> ApiResult<(StatusCode, Json<Contributor>)> {
    let project = find_scoped_project(&state, auth, project_id).await?;
    access::require_project_author(auth.user_id, project.author_id, project.id)?;

    // Resolve the target user first so a bad ID reads as 404 rather
    // than a foreign key conflict
    let user = User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let contributor = Contributor::create(&state.db, project_id, user.id).await?;

    Ok((StatusCode::CREATED, Json(contributor)))
}

/// Remove a contributor from a project (project author only)
///
/// # Errors
///
/// - `400 Bad Request`: Attempt to remove the project author
/// - `403 Forbidden`: Caller is a contributor but not the project author
/// - `404 Not Found`: Project out of scope, or no such membership
pub async fn remove_contributor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let project = find_scoped_project(&state, auth, project_id).await?;
    access::require_project_author(auth.user_id, project.author_id, project.id)?;

    // The author's membership is structural, it backs every scoped query
    if user_id == project.author_id {
        return Err(ApiError::BadRequest(
            "The project author cannot be removed from the project".to_string(),
        ));
    }

    let removed = Contributor::delete(&state.db, project_id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Contributor not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
