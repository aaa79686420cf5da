/// Integration tests for the API router
///
/// These tests exercise the HTTP surface that doesn't require a live
/// database: health reporting, the authentication middleware, token
/// verification, and request validation that runs before any query.
/// The pool is created lazily, so no connection is ever established.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use issuedeck_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use issuedeck_shared::auth::jwt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

fn test_app() -> Router {
    let config = Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://localhost:1/unreachable".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
    };

    // Lazy pool: connections are only attempted on first query
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .expect("lazy pool creation should not fail");

    build_router(AppState::new(pool, config))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn protected_route_requires_authorization_header() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn protected_route_rejects_non_bearer_scheme() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/projects")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_route_rejects_garbage_token() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/projects")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_rejects_refresh_token() {
    let app = test_app();

    // A refresh token must not pass as an access token
    let claims = jwt::Claims::new(Uuid::new_v4(), jwt::TokenType::Refresh);
    let token = jwt::create_token(&claims, JWT_SECRET).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/projects")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_accepts_valid_access_token() {
    let app = test_app();

    let user_id = Uuid::new_v4();
    let claims = jwt::Claims::new(user_id, jwt::TokenType::Access);
    let token = jwt::create_token(&claims, JWT_SECRET).unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/verify",
            serde_json::json!({ "token": token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["user_id"], user_id.to_string());
}

#[tokio::test]
async fn verify_rejects_invalid_token() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/verify",
            serde_json::json!({ "token": "not-a-jwt" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let app = test_app();

    let claims = jwt::Claims::new(Uuid::new_v4(), jwt::TokenType::Access);
    let token = jwt::create_token(&claims, JWT_SECRET).unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/refresh",
            serde_json::json!({ "refresh_token": token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            serde_json::json!({
                "username": "alice",
                "email": "not-an-email",
                "password": "SecureP4ss",
                "birth_date": "1990-04-12"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn register_rejects_underage_user() {
    let app = test_app();

    // A ten-year-old registrant
    let birth_date = chrono::Utc::now().date_naive() - chrono::Duration::days(10 * 365);

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            serde_json::json!({
                "username": "kiddo",
                "email": "kiddo@example.com",
                "password": "SecureP4ss",
                "birth_date": birth_date.to_string()
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "birth_date");
}

#[tokio::test]
async fn register_rejects_incoherent_consent_flags() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            serde_json::json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "SecureP4ss",
                "birth_date": "1985-01-01",
                "consent": false,
                "can_be_contacted": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "consent");
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let app = test_app();

    // Long enough but no uppercase or digit
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/auth/register",
            serde_json::json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "weakpassword",
                "birth_date": "1985-01-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "password");
}
