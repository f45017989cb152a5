use sqlx::{Pool, Sqlite};

use crate::crypto::PasswordHasher;
use crate::db::{MessageRepository, NewUser, UserRepository};
use crate::error::AppError;

/// Password shared by every fixture account
pub const SEED_PASSWORD: &str = "password";

const USERS: [(&str, &str, &str, &str); 2] = [
    ("test1", "Test1", "Testy1", "+14155550000"),
    ("joel", "Joel", "Burton", "+14155551212"),
];

const MESSAGES: [(&str, &str, &str); 4] = [
    ("joel", "test1", "joel-to-test"),
    ("joel", "test1", "joel-to-test2"),
    ("test1", "joel", "test-to-joel"),
    ("test1", "joel", "test-to-joel2"),
];

/// Wipe the store and load the two fixture users with a few messages between them.
/// Message ids restart at 1.
pub async fn seed(pool: &Pool<Sqlite>, hasher: &PasswordHasher) -> Result<(), AppError> {
    sqlx::query("DELETE FROM messages").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'messages'")
        .execute(pool)
        .await?;

    for (username, first_name, last_name, phone) in USERS {
        UserRepository::register(
            pool,
            hasher,
            NewUser {
                username: username.to_string(),
                password: SEED_PASSWORD.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                phone: phone.to_string(),
            },
        )
        .await?;
    }

    for (from, to, body) in MESSAGES {
        MessageRepository::create(pool, from, to, body).await?;
    }

    tracing::info!("🌱 Seeded {} users and {} messages", USERS.len(), MESSAGES.len());
    Ok(())
}
