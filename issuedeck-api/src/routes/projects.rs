/// Project endpoints
///
/// All reads are membership-scoped: a project outside the caller's
/// contributor set is indistinguishable from a nonexistent one (404).
/// Writes additionally require authorship.
///
/// # Endpoints
///
/// - `POST /v1/projects` - Create project (caller becomes author and contributor)
/// - `GET /v1/projects` - List the caller's projects
/// - `GET /v1/projects/:project_id` - Get one project
/// - `PUT /v1/projects/:project_id` - Update (author only)
/// - `DELETE /v1/projects/:project_id` - Delete (author only)

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
    models::project::{CreateProject, Project, ProjectType, UpdateProject},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Project category
    pub project_type: ProjectType,
}

/// Update project request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New category
    pub project_type: Option<ProjectType>,
}

/// Fetches a project within the caller's membership scope, or 404
pub(crate) async fn find_scoped_project(
    state: &AppState,
    auth: AuthContext,
    project_id: Uuid,
) -> ApiResult<Project> {
    Project::find_for_member(&state.db, project_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Create a new project
///
/// The caller becomes the project author and its first contributor in
/// the same transaction.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        auth.user_id,
        CreateProject {
            title: req.title,
            description: req.description,
            project_type: req.project_type,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// List the caller's projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_member(&state.db, auth.user_id).await?;

    Ok(Json(projects))
}

/// Get one project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = find_scoped_project(&state, auth, project_id).await?;

    Ok(Json(project))
}

/// Update a project (author only)
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a contributor but not the author
/// - `404 Not Found`: Out of scope or nonexistent
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let project = find_scoped_project(&state, auth, project_id).await?;
    access::require_author(auth.user_id, project.author_id)?;

    req.validate()?;

    let updated = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            title: req.title,
            description: req.description,
            project_type: req.project_type,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a project (author only)
///
/// Contributor rows, issues, and comments are removed with it.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = find_scoped_project(&state, auth, project_id).await?;
    access::require_author(auth.user_id, project.author_id)?;

    Project::delete(&state.db, project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
