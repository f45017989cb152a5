use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use messagely::{config::Config, crypto::PasswordHasher, db, error::AppError};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,messagely=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded");

    let pool = db::connect(&config).await?;
    tracing::info!("✅ Database connected and migrated: {}", config.database_url);

    let hasher = PasswordHasher::from_config(&config)?;
    db::seed(&pool, &hasher).await?;

    tracing::info!("🌱 Fixture logins: test1 / joel, password {:?}", db::seed::SEED_PASSWORD);
    pool.close().await;

    Ok(())
}
