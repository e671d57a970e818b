//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use auth::secrets::{SecretSource, load_client_secret};
use auth::{AuthConfig, CognitoProvider, PgSessionStore, ProviderConfig, auth_router};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

use auth::domain::repository::SessionRepository;

/// Interval between expiry sweeps
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired session rows
    // Errors here should not prevent server startup
    let session_store = PgSessionStore::new(pool.clone());
    match session_store.cleanup_expired().await {
        Ok(deleted) => {
            tracing::info!(sessions_deleted = deleted, "Startup session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Startup session cleanup failed, continuing anyway");
        }
    }

    // Supervised periodic sweep; a failed cycle is logged and the next
    // cycle still runs.
    let sweep_store = session_store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; startup already swept.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match sweep_store.cleanup_expired().await {
                Ok(deleted) => {
                    tracing::info!(sessions_deleted = deleted, "Session sweep completed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session sweep failed");
                }
            }
        }
    });

    // Identity provider configuration. The client secret is resolved
    // once here; a failure is fatal to startup.
    let provider_config = provider_config_from_env()?;
    let provider = CognitoProvider::new(provider_config)
        .map_err(|e| anyhow::anyhow!("Failed to build provider client: {e}"))?;

    // Auth configuration
    let mut auth_config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };
    if let Ok(secs) = env::var("SESSION_TTL_SECS") {
        auth_config.default_session_ttl = Duration::from_secs(secs.parse()?);
    }
    if let Ok(secure) = env::var("COOKIE_SECURE") {
        auth_config.cookie_secure = secure.parse()?;
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", auth_router(session_store, provider, auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Liveness response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Assemble the provider configuration from the environment
fn provider_config_from_env() -> anyhow::Result<ProviderConfig> {
    let region = env::var("PROVIDER_REGION").expect("PROVIDER_REGION must be set in environment");
    let client_id =
        env::var("PROVIDER_CLIENT_ID").expect("PROVIDER_CLIENT_ID must be set in environment");

    // Secret file wins over the plain variable when both are present.
    let source = match env::var("PROVIDER_CLIENT_SECRET_FILE") {
        Ok(path) => SecretSource::File(path.into()),
        Err(_) => SecretSource::Env("PROVIDER_CLIENT_SECRET".to_string()),
    };
    let client_secret = load_client_secret(&source)
        .map_err(|e| anyhow::anyhow!("Failed to resolve provider client secret: {e}"))?;

    let mut config = ProviderConfig::new(region, client_id, client_secret);
    if let Ok(endpoint) = env::var("PROVIDER_ENDPOINT") {
        config.endpoint = Some(endpoint);
    }
    if let Ok(millis) = env::var("PROVIDER_TIMEOUT_MS") {
        config.timeout = Duration::from_millis(millis.parse()?);
    }

    Ok(config)
}
