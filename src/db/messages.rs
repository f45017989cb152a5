use sqlx::{Pool, Sqlite};

use crate::db::models::{
    Message, MessageDetail, MessageDetailRow, MessageWithContactRow, ReceivedMessage, SentMessage,
};
use crate::db::{now, UserRepository};
use crate::error::AppError;

pub struct MessageRepository;

impl MessageRepository {
    /// Store a message. Both participants must already exist.
    pub async fn create(
        pool: &Pool<Sqlite>,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        for username in [from_username, to_username] {
            if !UserRepository::exists(pool, username).await? {
                return Err(AppError::NotFound(format!("No such user: {}", username)));
            }
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
INSERT INTO messages (from_username, to_username, body, sent_at, read_at)
VALUES (?, ?, ?, ?, NULL)
RETURNING *
            "#,
        )
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .bind(now())
        .fetch_one(pool)
        .await?;

        tracing::debug!("✉️ Message {} stored ({} -> {})", message.id, from_username, to_username);
        Ok(message)
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<MessageDetail, AppError> {
        let row = sqlx::query_as::<_, MessageDetailRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       f.username AS from_username, f.first_name AS from_first_name,
       f.last_name AS from_last_name, f.phone AS from_phone,
       t.username AS to_username, t.first_name AS to_first_name,
       t.last_name AS to_last_name, t.phone AS to_phone
FROM messages m
JOIN users f ON m.from_username = f.username
JOIN users t ON m.to_username = t.username
WHERE m.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such message: {}", id)))?;

        Ok(row.into())
    }

    /// Set `read_at`. A message that is already read keeps its first timestamp.
    pub async fn mark_read(pool: &Pool<Sqlite>, id: i64) -> Result<Message, AppError> {
        sqlx::query("UPDATE messages SET read_at = ? WHERE id = ? AND read_at IS NULL")
            .bind(now())
            .bind(id)
            .execute(pool)
            .await?;

        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No such message: {}", id)))
    }

    /// Messages sent by `username`, oldest first. Unknown users simply have none.
    pub async fn list_from(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Vec<SentMessage>, AppError> {
        let rows = sqlx::query_as::<_, MessageWithContactRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       u.username, u.first_name, u.last_name, u.phone
FROM messages m
JOIN users u ON m.to_username = u.username
WHERE m.from_username = ?
ORDER BY m.id ASC
            "#,
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(SentMessage::from).collect())
    }

    /// Messages received by `username`, oldest first
    pub async fn list_to(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Vec<ReceivedMessage>, AppError> {
        let rows = sqlx::query_as::<_, MessageWithContactRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       u.username, u.first_name, u.last_name, u.phone
FROM messages m
JOIN users u ON m.from_username = u.username
WHERE m.to_username = ?
ORDER BY m.id ASC
            "#,
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(ReceivedMessage::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::db::users::tests::{hasher, new_user};

    async fn seeded() -> Pool<Sqlite> {
        let pool = connect_in_memory().await.unwrap();
        for name in ["alice", "bob"] {
            UserRepository::register(&pool, &hasher(), new_user(name)).await.unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = seeded().await;

        let message = MessageRepository::create(&pool, "alice", "bob", "hi").await.unwrap();
        assert_eq!(message.from_username, "alice");
        assert_eq!(message.to_username, "bob");
        assert_eq!(message.read_at, None);

        let detail = MessageRepository::get(&pool, message.id).await.unwrap();
        assert_eq!(detail.body, "hi");
        assert_eq!(detail.read_at, None);
        assert_eq!(detail.from_user.username, "alice");
        assert_eq!(detail.from_user.first_name, "alice-first");
        assert_eq!(detail.to_user.username, "bob");
        assert_eq!(detail.to_user.phone, "+14155550000");
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let pool = seeded().await;

        let first = MessageRepository::create(&pool, "alice", "bob", "one").await.unwrap();
        let second = MessageRepository::create(&pool, "bob", "alice", "two").await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_create_requires_existing_users() {
        let pool = seeded().await;

        let to_ghost = MessageRepository::create(&pool, "alice", "ghost", "hi").await;
        assert!(matches!(to_ghost, Err(AppError::NotFound(_))));

        let from_ghost = MessageRepository::create(&pool, "ghost", "bob", "hi").await;
        assert!(matches!(from_ghost, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_message_to_self() {
        let pool = seeded().await;

        let message = MessageRepository::create(&pool, "alice", "alice", "note").await.unwrap();
        let detail = MessageRepository::get(&pool, message.id).await.unwrap();
        assert_eq!(detail.from_user, detail.to_user);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let pool = seeded().await;
        assert!(matches!(
            MessageRepository::get(&pool, 999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_read_is_sticky() {
        let pool = seeded().await;
        let message = MessageRepository::create(&pool, "alice", "bob", "hi").await.unwrap();

        let read = MessageRepository::mark_read(&pool, message.id).await.unwrap();
        let first_read_at = read.read_at.expect("read_at set");

        // Backdate so a refresh would be visible
        sqlx::query("UPDATE messages SET read_at = 1 WHERE id = ?")
            .bind(message.id)
            .execute(&pool)
            .await
            .unwrap();

        let again = MessageRepository::mark_read(&pool, message.id).await.unwrap();
        assert_eq!(again.read_at, Some(1));
        assert!(first_read_at >= message.sent_at);
    }

    #[tokio::test]
    async fn test_mark_read_missing() {
        let pool = seeded().await;
        assert!(matches!(
            MessageRepository::mark_read(&pool, 42).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_from_and_to() {
        let pool = seeded().await;
        MessageRepository::create(&pool, "alice", "bob", "u1-to-u2").await.unwrap();
        MessageRepository::create(&pool, "bob", "alice", "u2-to-u1").await.unwrap();

        let sent = MessageRepository::list_from(&pool, "alice").await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "u1-to-u2");
        assert_eq!(sent[0].to_user.username, "bob");

        let received = MessageRepository::list_to(&pool, "alice").await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].body, "u2-to-u1");
        assert_eq!(received[0].from_user.username, "bob");
    }

    #[tokio::test]
    async fn test_lists_for_unknown_user_are_empty() {
        let pool = seeded().await;
        assert!(MessageRepository::list_from(&pool, "ghost").await.unwrap().is_empty());
        assert!(MessageRepository::list_to(&pool, "ghost").await.unwrap().is_empty());
    }
}
