use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::extract::PathParam;
use crate::api::state::AppState;
use crate::db::{MessageRepository, ReceivedMessage, SentMessage, User, UserRepository, UserSummary};
use crate::error::AppError;
use crate::policy::{self, Identity};

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse<T> {
    pub messages: Vec<T>,
}

/// GET /api/users (requires auth)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserListResponse>, AppError> {
    policy::authorize_list_users(&identity)?;

    let users = UserRepository::list(&state.db).await?;
    Ok(Json(UserListResponse { users }))
}

/// GET /api/users/:username (requires auth, self only)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    PathParam(username): PathParam<String>,
) -> Result<Json<UserResponse>, AppError> {
    policy::authorize_self(&identity, &username)?;

    let user = UserRepository::get(&state.db, &username).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /api/users/:username/to (requires auth, self only)
pub async fn messages_to(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    PathParam(username): PathParam<String>,
) -> Result<Json<MessageListResponse<ReceivedMessage>>, AppError> {
    policy::authorize_self(&identity, &username)?;

    let messages = MessageRepository::list_to(&state.db, &username).await?;
    Ok(Json(MessageListResponse { messages }))
}

/// GET /api/users/:username/from (requires auth, self only)
pub async fn messages_from(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    PathParam(username): PathParam<String>,
) -> Result<Json<MessageListResponse<SentMessage>>, AppError> {
    policy::authorize_self(&identity, &username)?;

    let messages = MessageRepository::list_from(&state.db, &username).await?;
    Ok(Json(MessageListResponse { messages }))
}
