/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration (with age and consent checks)
/// - Login
/// - Token refresh
/// - Token verification
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/verify` - Verify an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use issuedeck_shared::{
    auth::{jwt, password},
    models::user::{self, CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (unique)
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Date of birth, used for the minimum-age check
    pub birth_date: NaiveDate,

    /// Consent to data processing
    #[serde(default)]
    pub consent: bool,

    /// Whether the user may be contacted (requires consent)
    #[serde(default)]
    pub can_be_contacted: bool,

    /// Whether the user's data may be shared (requires consent)
    #[serde(default)]
    pub can_data_be_shared: bool,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Verify token request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Access token to verify
    pub token: String,
}

/// Verify token response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// User the token belongs to
    pub user_id: String,

    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
}

/// Register a new user
///
/// Creates a new user account. Registrants must be at least 15 years
/// old, and the contact/data-sharing flags require the consent flag.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "SecureP4ss",
///   "birth_date": "1990-04-12",
///   "consent": true,
///   "can_be_contacted": true,
///   "can_data_be_shared": false
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Field validation, underage, or
///   incoherent consent flags
/// - `409 Conflict`: Username or email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    // Validate password strength
    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    // Minimum-age rule
    user::validate_birth_date(req.birth_date, Utc::now().date_naive())
        .map_err(|e| ApiError::invalid_field("birth_date", e))?;

    // Consent coherence
    user::validate_consent(req.consent, req.can_be_contacted, req.can_data_be_shared)
        .map_err(|e| ApiError::invalid_field("consent", e))?;

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            birth_date: req.birth_date,
            consent: req.consent,
            can_be_contacted: req.can_be_contacted,
            can_data_be_shared: req.can_data_be_shared,
        },
    )
    .await?;

    // Generate tokens
    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id.to_string(),
            access_token,
            refresh_token,
        }),
    ))
}

/// Login endpoint
///
/// Authenticates a user by username and password and returns JWT tokens.
/// Anonymized (deactivated) accounts cannot log in.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials or deactivated account
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    // Find user by username; the error is identical for unknown users
    // and wrong passwords
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    // Generate tokens
    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token. The account is
/// re-checked against the store, so a refresh token held for an
/// anonymized (deactivated) account cannot mint new access tokens.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or
///   deactivated account
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Token verification endpoint
///
/// Validates an access token and reports its subject and expiration.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or non-access token
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let claims = jwt::validate_access_token(&req.token, state.jwt_secret())?;

    Ok(Json(VerifyResponse {
        user_id: claims.sub.to_string(),
        expires_at: claims.exp,
    }))
}
