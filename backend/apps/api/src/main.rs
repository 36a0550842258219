//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::State,
    http::{self, HeaderName, Method, header},
    routing::get,
};
use quest::{PgQuestRepository, quest_router};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ServerConfig, quest_config_from_env};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health
async fn health(State(repo): State<PgQuestRepository>) -> AppResult<Json<HealthResponse>> {
    repo.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Health check failed");
        AppError::service_unavailable("Database unavailable")
    })?;
    Ok(Json(HealthResponse { status: "ok" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,quest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env()?;
    let quest_config = quest_config_from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(server.max_connections)
        .connect(&server.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = PgQuestRepository::new(pool);

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = server
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(quest::presentation::middleware::MASTER_PIN_HEADER),
        ]));

    // Single-page app: unknown paths get index.html
    let index = server.static_dir.join("index.html");
    let spa = ServeDir::new(&server.static_dir).not_found_service(ServeFile::new(index));

    // Build router
    let app = Router::new()
        .nest("/api", quest_router(repo.clone(), quest_config))
        .route("/health", get(health).with_state(repo))
        .fallback_service(spa)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    tracing::info!(
        addr = %server.addr,
        static_dir = %server.static_dir.display(),
        "Listening"
    );

    let listener = TcpListener::bind(server.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
