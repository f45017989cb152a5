use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use messagely::{
    api::{create_router, AppState},
    config::Config,
    db,
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,messagely=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Messagely server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Connection pool + migrations
    let pool = db::connect(&config).await?;
    tracing::info!("✅ Database connected and migrated: {}", config.database_url);

    // Signing key and password hasher are fixed for the life of the process
    let state = AppState::new(pool, config.clone())?;
    tracing::info!(
        "✅ Sessions expire after {}h, password hashing at m={}KiB t={} p={}",
        config.token_ttl_hours,
        config.hash_memory_kib,
        config.hash_iterations,
        config.hash_parallelism,
    );

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  POST /api/auth/register          - Register new user");
    tracing::info!("  POST /api/auth/login             - Login with password");
    tracing::info!("  GET  /api/users                  - List users (requires auth)");
    tracing::info!("  GET  /api/users/:username        - User detail (requires auth, self)");
    tracing::info!("  GET  /api/users/:username/to     - Inbox (requires auth, self)");
    tracing::info!("  GET  /api/users/:username/from   - Outbox (requires auth, self)");
    tracing::info!("  POST /api/messages               - Send message (requires auth)");
    tracing::info!("  GET  /api/messages/:id           - Read message (requires auth)");
    tracing::info!("  POST /api/messages/:id/read      - Mark read (requires auth, recipient)");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
