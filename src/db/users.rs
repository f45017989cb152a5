use sqlx::{Pool, Sqlite};

use crate::crypto::PasswordHasher;
use crate::db::models::{NewUser, User, UserRow, UserSummary};
use crate::db::now;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    /// Store a new user, hashing the password on the way in.
    /// `last_login_at` starts out null.
    pub async fn register(
        pool: &Pool<Sqlite>,
        hasher: &PasswordHasher,
        new_user: NewUser,
    ) -> Result<User, AppError> {
        if Self::exists(pool, &new_user.username).await? {
            return Err(AppError::Conflict(format!(
                "Username already taken: {}",
                new_user.username
            )));
        }

        let password_hash = hasher.hash_blocking(new_user.password).await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
INSERT INTO users (username, password_hash, first_name, last_name, phone, joined_at, last_login_at)
VALUES (?, ?, ?, ?, ?, ?, NULL)
RETURNING *
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone)
        .bind(now())
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username already taken: {}", new_user.username))
            }
            other => AppError::Database(other),
        })?;

        tracing::info!("👤 Registered user {}", row.username);
        Ok(row.into())
    }

    /// True iff the user exists and the password matches.
    /// Unknown users fail closed.
    pub async fn authenticate(
        pool: &Pool<Sqlite>,
        hasher: &PasswordHasher,
        username: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(pool)
                .await?;

        match stored {
            Some(hash) => Ok(hasher.verify_blocking(password.to_string(), hash).await),
            // Same Argon2 cost as a wrong password
            None => Ok(hasher.reject_blocking(password.to_string()).await),
        }
    }

    /// Stamp `last_login_at`. Call only after a successful authentication.
    pub async fn touch_login(pool: &Pool<Sqlite>, username: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET last_login_at = ? WHERE username = ?")
            .bind(now())
            .bind(username)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No such user: {}", username)));
        }

        Ok(())
    }

    pub async fn get(pool: &Pool<Sqlite>, username: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
SELECT username, first_name, last_name, phone, joined_at, last_login_at
FROM users
WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such user: {}", username)))
    }

    pub async fn exists(pool: &Pool<Sqlite>, username: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(found.is_some())
    }

    /// All users, ordered by username
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT username, first_name, last_name FROM users ORDER BY username"
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    pub(crate) fn hasher() -> PasswordHasher {
        PasswordHasher::new(8, 1, 1).unwrap()
    }

    pub(crate) fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "password".to_string(),
            first_name: format!("{}-first", username),
            last_name: format!("{}-last", username),
            phone: "+14155550000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let pool = connect_in_memory().await.unwrap();

        let user = UserRepository::register(&pool, &hasher(), new_user("alice")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.first_name, "alice-first");
        assert!(user.joined_at > 0);
        assert_eq!(user.last_login_at, None);

        let fetched = UserRepository::get(&pool, "alice").await.unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn test_register_duplicate_conflicts() {
        let pool = connect_in_memory().await.unwrap();

        UserRepository::register(&pool, &hasher(), new_user("alice")).await.unwrap();
        let result = UserRepository::register(&pool, &hasher(), new_user("alice")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_registration_conflicts() {
        let pool = connect_in_memory().await.unwrap();
        let hasher = hasher();

        // Both existence checks can pass before either insert lands
        let (first, second) = tokio::join!(
            UserRepository::register(&pool, &hasher, new_user("alice")),
            UserRepository::register(&pool, &hasher, new_user("alice")),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|r| matches!(r, Err(AppError::Conflict(_))))
                .count(),
            1
        );
        assert_eq!(UserRepository::list(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let pool = connect_in_memory().await.unwrap();
        UserRepository::register(&pool, &hasher(), new_user("alice")).await.unwrap();

        let stored: String =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'alice'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_ne!(stored, "password");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let pool = connect_in_memory().await.unwrap();
        let hasher = hasher();
        UserRepository::register(&pool, &hasher, new_user("alice")).await.unwrap();

        assert!(UserRepository::authenticate(&pool, &hasher, "alice", "password").await.unwrap());
        assert!(!UserRepository::authenticate(&pool, &hasher, "alice", "passwordx").await.unwrap());
        assert!(!UserRepository::authenticate(&pool, &hasher, "nobody", "password").await.unwrap());
        assert!(!UserRepository::authenticate(&pool, &hasher, "nobody", "no-such-user").await.unwrap());
    }

    #[tokio::test]
    async fn test_touch_login() {
        let pool = connect_in_memory().await.unwrap();
        UserRepository::register(&pool, &hasher(), new_user("alice")).await.unwrap();

        UserRepository::touch_login(&pool, "alice").await.unwrap();
        let user = UserRepository::get(&pool, "alice").await.unwrap();
        assert!(user.last_login_at.is_some());

        let missing = UserRepository::touch_login(&pool, "nobody").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let pool = connect_in_memory().await.unwrap();
        let result = UserRepository::get(&pool, "nobody").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let pool = connect_in_memory().await.unwrap();
        for name in ["carol", "alice", "bob"] {
            UserRepository::register(&pool, &hasher(), new_user(name)).await.unwrap();
        }

        let names: Vec<String> = UserRepository::list(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
