use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::extract::{JsonBody, PathParam};
use crate::api::state::AppState;
use crate::db::{MessageDetail, MessageRepository};
use crate::error::AppError;
use crate::policy::{self, Identity};

const MAX_BODY_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub to_username: String,
    pub body: String,
}

/// A freshly stored message. It cannot have been read yet.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedMessage {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub id: i64,
    pub read_at: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub message: T,
}

/// GET /api/messages/:id (requires auth, sender or recipient)
pub async fn get_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MessageResponse<MessageDetail>>, AppError> {
    let message = MessageRepository::get(&state.db, id).await?;
    policy::authorize_read_message(&identity, &message)?;

    Ok(Json(MessageResponse { message }))
}

/// POST /api/messages (requires auth)
pub async fn send_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<Json<MessageResponse<CreatedMessage>>, AppError> {
    // Validate content length
    if req.body.is_empty() || req.body.len() > MAX_BODY_LEN {
        return Err(AppError::BadRequest(format!(
            "Message must be 1-{} bytes",
            MAX_BODY_LEN
        )));
    }

    let message = MessageRepository::create(
        &state.db,
        identity.username(),
        &req.to_username,
        &req.body,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: CreatedMessage {
            id: message.id,
            from_username: message.from_username,
            to_username: message.to_username,
            body: message.body,
            sent_at: message.sent_at,
        },
    }))
}

/// POST /api/messages/:id/read (requires auth, recipient only)
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MessageResponse<ReadReceipt>>, AppError> {
    let message = MessageRepository::get(&state.db, id).await?;
    policy::authorize_mark_read(&identity, &message)?;

    let message = MessageRepository::mark_read(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: ReadReceipt {
            id: message.id,
            read_at: message.read_at,
        },
    }))
}
