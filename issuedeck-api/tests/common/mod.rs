/// Common test utilities for database-backed integration tests
///
/// This module provides shared infrastructure:
/// - Test database setup (created and migrated on first use)
/// - Test user creation with ready-made JWT tokens
/// - Request builders and JSON body helpers
///
/// Contexts return `None` when `TEST_DATABASE_URL` is not set so the
/// suites can be skipped in environments without PostgreSQL.

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use http_body_util::BodyExt;
use issuedeck_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use issuedeck_shared::auth::jwt::{create_token, Claims, TokenType};
use issuedeck_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool,
};
use issuedeck_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

pub const JWT_SECRET: &str = "db-integration-test-secret-at-least-32-bytes";

/// Test context holding the database pool and the router under test
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a context against the database named by `TEST_DATABASE_URL`
    pub async fn new() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        ensure_database_exists(&url)
            .await
            .expect("Failed to ensure test database exists");

        let db = pool::create_pool(pool::DatabaseConfig {
            url: url.clone(),
            ..Default::default()
        })
        .await
        .expect("Failed to create pool");

        run_migrations(&db).await.expect("Migrations failed");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
            },
        };

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self { db, app })
    }

    /// Creates a user directly in the store with access and refresh tokens
    ///
    /// Returns `(user, access_token, refresh_token)`.
    pub async fn create_user(&self, prefix: &str) -> (User, String, String) {
        let suffix = Uuid::new_v4().simple().to_string();
        let tag = &suffix[..12];

        let user = User::create(
            &self.db,
            CreateUser {
                username: format!("{}-{}", prefix, tag),
                email: format!("{}-{}@example.com", prefix, tag),
                password_hash: "$argon2id$v=19$m=65536,t=3,p=4$dGVzdHNhbHQ$placeholder"
                    .to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                consent: true,
                can_be_contacted: false,
                can_data_be_shared: false,
            },
        )
        .await
        .expect("Failed to create test user");

        let access = create_token(&Claims::new(user.id, TokenType::Access), JWT_SECRET)
            .expect("Failed to create access token");
        let refresh = create_token(&Claims::new(user.id, TokenType::Refresh), JWT_SECRET)
            .expect("Failed to create refresh token");

        (user, access, refresh)
    }
}

/// Builds a request with an optional bearer token and JSON body
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collects a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
