//! # Issuedeck API Server
//!
//! This is the main API server for issuedeck, a project issue tracker
//! with author/contributor access control.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Account registration, login, and JWT session management
//! - Projects with transactional author membership
//! - Contributor management, issues, and comments scoped to membership
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p issuedeck-api
//! ```

use issuedeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use issuedeck_shared::db::{migrations::run_migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "issuedeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Issuedeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
