use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full `users` row. Only the user repository ever loads one.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: i64,
    pub last_login_at: Option<i64>,
}

/// User detail, safe for client responses (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: i64,
    pub last_login_at: Option<i64>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            joined_at: row.joined_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Directory listing entry
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// The other party of a message, as embedded in message responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContact {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
}

/// A message with both participants joined in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_user: UserContact,
    pub to_user: UserContact,
}

/// Entry of a sender's outbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub to_user: UserContact,
}

/// Entry of a recipient's inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_user: UserContact,
}

#[derive(Debug, FromRow)]
pub struct MessageDetailRow {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_username: String,
    pub from_first_name: String,
    pub from_last_name: String,
    pub from_phone: String,
    pub to_username: String,
    pub to_first_name: String,
    pub to_last_name: String,
    pub to_phone: String,
}

impl From<MessageDetailRow> for MessageDetail {
    fn from(row: MessageDetailRow) -> Self {
        MessageDetail {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            from_user: UserContact {
                username: row.from_username,
                first_name: row.from_first_name,
                last_name: row.from_last_name,
                phone: row.from_phone,
            },
            to_user: UserContact {
                username: row.to_username,
                first_name: row.to_first_name,
                last_name: row.to_last_name,
                phone: row.to_phone,
            },
        }
    }
}

/// One side of a message joined with the other party's contact columns
#[derive(Debug, FromRow)]
pub struct MessageWithContactRow {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl MessageWithContactRow {
    fn split(self) -> (i64, String, i64, Option<i64>, UserContact) {
        let contact = UserContact {
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
        };
        (self.id, self.body, self.sent_at, self.read_at, contact)
    }
}

impl From<MessageWithContactRow> for SentMessage {
    fn from(row: MessageWithContactRow) -> Self {
        let (id, body, sent_at, read_at, to_user) = row.split();
        SentMessage { id, body, sent_at, read_at, to_user }
    }
}

impl From<MessageWithContactRow> for ReceivedMessage {
    fn from(row: MessageWithContactRow) -> Self {
        let (id, body, sent_at, read_at, from_user) = row.split();
        ReceivedMessage { id, body, sent_at, read_at, from_user }
    }
}
