pub mod models;
pub mod users;
pub mod messages;
pub mod seed;

pub use models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserContact, UserSummary,
};
pub use users::UserRepository;
pub use messages::MessageRepository;
pub use seed::seed;

use std::time::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::error::AppError;

/// Open the connection pool and bring the schema up to date
pub async fn connect(config: &Config) -> Result<Pool<Sqlite>, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
}

/// Single-connection in-memory database, migrated. Every call is a fresh store.
pub async fn connect_in_memory() -> Result<Pool<Sqlite>, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
