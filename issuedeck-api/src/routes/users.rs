/// User account endpoints
///
/// Accounts are strictly self-scoped: every route only operates on the
/// authenticated user's own row. Requests for any other user ID return
/// 404, the same as a nonexistent ID, so account IDs cannot be probed.
///
/// # Endpoints
///
/// - `GET /v1/users` - List visible accounts (always just the caller's)
/// - `GET /v1/users/:id` - Get own account
/// - `PUT /v1/users/:id` - Update own account
/// - `DELETE /v1/users/:id` - Anonymize own account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use issuedeck_shared::{
    auth::{context::AuthContext, password},
    models::user::{self, UpdateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User representation returned by the API
///
/// Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: Option<String>,

    /// Date of birth
    pub birth_date: Option<NaiveDate>,

    /// Consent to data processing
    pub consent: bool,

    /// Contact permission
    pub can_be_contacted: bool,

    /// Data-sharing permission
    pub can_data_be_shared: bool,

    /// Whether the account is active
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            birth_date: user.birth_date,
            consent: user.consent,
            can_be_contacted: user.can_be_contacted,
            can_data_be_shared: user.can_data_be_shared,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Update user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    /// New consent value
    pub consent: Option<bool>,

    /// New contact permission
    pub can_be_contacted: Option<bool>,

    /// New data-sharing permission
    pub can_data_be_shared: Option<bool>,
}

/// Returns the caller's own user row, or 404 for any other ID
async fn find_own_user(state: &AppState, auth: AuthContext, id: Uuid) -> ApiResult<User> {
    if id != auth.user_id {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// List visible user accounts
///
/// Accounts are self-scoped, so the list always contains exactly the
/// caller's own account.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let user = find_own_user(&state, auth, auth.user_id).await?;

    Ok(Json(vec![user.into()]))
}

/// Get a user account
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = find_own_user(&state, auth, id).await?;

    Ok(Json(user.into()))
}

/// Update a user account
///
/// The consent coherence rule is evaluated against the account state
/// that would result from the update, so consent cannot be withdrawn
/// while contact or data-sharing flags remain set.
///
/// # Errors
///
/// - `404 Not Found`: Not the caller's own account
/// - `409 Conflict`: Email already in use
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let current = find_own_user(&state, auth, id).await?;

    req.validate()?;

    // Consent coherence against the resulting state
    let consent = req.consent.unwrap_or(current.consent);
    let can_be_contacted = req.can_be_contacted.unwrap_or(current.can_be_contacted);
    let can_data_be_shared = req.can_data_be_shared.unwrap_or(current.can_data_be_shared);

    user::validate_consent(consent, can_be_contacted, can_data_be_shared)
        .map_err(|e| ApiError::invalid_field("consent", e))?;

    let password_hash = match &req.password {
        Some(pw) => {
            password::validate_password_strength(pw)
                .map_err(|e| ApiError::invalid_field("password", e))?;
            Some(password::hash_password(pw)?)
        }
        None => None,
    };

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email,
            password_hash,
            consent: req.consent,
            can_be_contacted: req.can_be_contacted,
            can_data_be_shared: req.can_data_be_shared,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(updated.into()))
}

/// Delete (anonymize) a user account
///
/// The row is kept so authored projects, issues, and comments retain a
/// valid author; all personal data is cleared and the account is
/// deactivated. Outstanding tokens stop working on the next request:
/// both the authentication layer and the refresh endpoint re-check the
/// account's active flag against the store.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    find_own_user(&state, auth, id).await?;

    User::anonymize(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}
